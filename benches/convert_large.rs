//! This bench converts a large generated API description into a collection,
//! and postprocesses a large documentation page.

#![allow(missing_docs)]

use std::fmt::Write;

use apisync::{Converter, ConvertOptions, MermaidConfig, OpenApiConverter, docs};
use criterion::{Criterion, criterion_group, criterion_main};

/// Generates a description with `resources` CRUD resources sharing a schema
fn large_description(resources: usize) -> String {
    let mut document = String::from(
        "openapi: 3.0.3\ninfo: {title: Large, version: '1'}\nservers:\n  - url: https://api.example.com\npaths:\n",
    );
    for i in 0..resources {
        write!(
            document,
            "  /resource{i}:
    get:
      tags: [group{group}]
      parameters:
        - {{name: limit, in: query, schema: {{type: integer, minimum: 1, maximum: 100}}}}
      responses:
        '200':
          description: OK
          content:
            application/json:
              schema: {{type: array, items: {{$ref: '#/components/schemas/Record'}}}}
    post:
      tags: [group{group}]
      requestBody:
        content:
          application/json:
            schema: {{$ref: '#/components/schemas/Record'}}
      responses:
        '201': {{description: Created}}
  /resource{i}/{{id}}:
    delete:
      tags: [group{group}]
      parameters:
        - {{name: id, in: path, required: true, schema: {{type: string, format: uuid}}}}
      responses:
        '204': {{description: Deleted}}
",
            group = i % 10
        )
        .unwrap();
    }
    document.push_str(
        "components:
  schemas:
    Record:
      type: object
      required: [id, name]
      properties:
        id: {type: string, format: uuid}
        name: {type: string, minLength: 3}
        createdAt: {type: string, format: date-time}
        tags: {type: array, items: {type: string}}
        owner: {$ref: '#/components/schemas/Owner'}
    Owner:
      type: object
      properties:
        email: {type: string, format: email}
        age: {type: integer, minimum: 18}
",
    );
    document
}

fn large_page(diagrams: usize) -> String {
    let mut html = String::from("<html><body>\n");
    for i in 0..diagrams {
        write!(
            html,
            "<h2>Flow {i}</h2>\n<p>Some prose &amp; more.</p>\n<pre><code class=\"language-mermaid\">graph TD; A{i}--&gt;B{i};</code></pre>\n"
        )
        .unwrap();
    }
    html.push_str("</body></html>\n");
    html
}

fn convert_large(c: &mut Criterion) {
    let document = large_description(200);
    let options = ConvertOptions::default();
    c.bench_function("convert 600 operations", |b| {
        b.iter(|| OpenApiConverter.convert(&document, &options).unwrap());
    });
}

fn inject_mermaid(c: &mut Criterion) {
    let html = large_page(500);
    let config = MermaidConfig::default();
    c.bench_function("inject 500 diagrams", |b| {
        b.iter(|| docs::inject(&html, &config));
    });
}

criterion_group!(benches, convert_large, inject_mermaid);
criterion_main!(benches);
