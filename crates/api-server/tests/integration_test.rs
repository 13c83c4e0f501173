//! Integration tests for API server
//!
//! These tests start the API server on a loopback port, upload workbooks
//! built in memory and verify the JSON, Markdown and error responses.

use reqwest::multipart::{Form, Part};
use reqwest::StatusCode;
use sheetstyle_api_server::ServerConfig;
use sheetstyle_core::fixtures::{FixtureValue, StyleSpec, XlsxBuilder};
use sheetstyle_core::SheetData;

/// Start the server on an ephemeral port and return its base URL
async fn spawn_server() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test listener");
    let addr = listener.local_addr().expect("Failed to read local addr");
    let config = ServerConfig::new(addr.to_string(), 10);

    tokio::spawn(async move {
        sheetstyle_api_server::serve(listener, &config)
            .await
            .expect("Failed to start server");
    });

    format!("http://{addr}")
}

fn file_part(bytes: Vec<u8>) -> Part {
    Part::bytes(bytes)
        .file_name("book.xlsx")
        .mime_str("application/vnd.openxmlformats-officedocument.spreadsheetml.sheet")
        .expect("valid mime")
}

/// One sheet, A1 = "Hello", bold on a solid red fill
fn hello_workbook() -> Vec<u8> {
    let mut book = XlsxBuilder::new();
    let style = book.add_style(StyleSpec {
        bold: true,
        fill_pattern: Some("solid".to_string()),
        fill_rgb: Some("FFFF0000".to_string()),
        ..Default::default()
    });
    let sheet = book.add_sheet("Sheet1");
    book.set(sheet, "A1", FixtureValue::Text("Hello".to_string()), style);
    book.build()
}

/// Three sheets with distinct content
fn multi_sheet_workbook() -> Vec<u8> {
    let mut book = XlsxBuilder::new();
    let revenue = book.add_sheet("Revenue");
    book.text(revenue, "A1", "Quarter").number(revenue, "B1", 1250.5);
    let costs = book.add_sheet("Costs");
    book.text(costs, "C3", "Rent");
    let notes = book.add_sheet("Archive 2023");
    book.text(notes, "A1", "old");
    book.build()
}

async fn analyze(base: &str, bytes: Vec<u8>, sheet_name: Option<&str>) -> reqwest::Response {
    let mut form = Form::new().part("file", file_part(bytes));
    if let Some(name) = sheet_name {
        form = form.text("sheet_name", name.to_string());
    }
    reqwest::Client::new()
        .post(format!("{base}/api/analyze-sheet"))
        .multipart(form)
        .send()
        .await
        .expect("Failed to send analyze request")
}

#[tokio::test]
async fn test_health_endpoint() {
    let base = spawn_server().await;

    let response = reqwest::get(format!("{base}/health"))
        .await
        .expect("Failed to send health check request");
    assert_eq!(response.status(), StatusCode::OK);

    let json: serde_json::Value = response.json().await.expect("Failed to parse JSON");
    assert_eq!(json["status"], "ok");
    assert!(json["version"].is_string());
}

#[tokio::test]
async fn test_sheets_in_document_order() {
    let base = spawn_server().await;

    let form = Form::new().part("file", file_part(multi_sheet_workbook()));
    let response = reqwest::Client::new()
        .post(format!("{base}/api/sheets"))
        .multipart(form)
        .send()
        .await
        .expect("Failed to send sheets request");
    assert_eq!(response.status(), StatusCode::OK);

    let names: Vec<String> = response.json().await.expect("Failed to parse JSON");
    assert_eq!(names, vec!["Revenue", "Costs", "Archive 2023"]);
}

#[tokio::test]
async fn test_analyze_hello_cell_end_to_end() {
    let base = spawn_server().await;

    let response = analyze(&base, hello_workbook(), None).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json: serde_json::Value = response.json().await.expect("Failed to parse JSON");
    assert_eq!(
        json,
        serde_json::json!({
            "name": "Sheet1",
            "cells": [{
                "content": "Hello",
                "address": "A1",
                "style": {
                    "backgroundColor": "#FF0000",
                    "color": null,
                    "fontWeight": "bold",
                    "fontStyle": null,
                    "textDecoration": null
                }
            }]
        })
    );
}

#[tokio::test]
async fn test_analyze_named_sheet() {
    let base = spawn_server().await;

    let response = analyze(&base, multi_sheet_workbook(), Some("Costs")).await;
    assert_eq!(response.status(), StatusCode::OK);

    let sheet: SheetData = response.json().await.expect("Failed to parse JSON");
    assert_eq!(sheet.name, "Costs");
    assert_eq!(sheet.cells.len(), 1);
    assert_eq!(sheet.cells[0].address, "C3");
    assert_eq!(sheet.cells[0].content, "Rent");
}

#[tokio::test]
async fn test_unknown_or_empty_sheet_name_uses_first_sheet() {
    let base = spawn_server().await;

    let expected: SheetData = analyze(&base, multi_sheet_workbook(), Some("Revenue"))
        .await
        .json()
        .await
        .expect("Failed to parse JSON");
    assert_eq!(expected.name, "Revenue");
    assert_eq!(expected.cells.len(), 2);
    assert_eq!(expected.cells[1].content, "1250.5");

    for requested in [None, Some(""), Some("Nope"), Some("revenue")] {
        let response = analyze(&base, multi_sheet_workbook(), requested).await;
        assert_eq!(response.status(), StatusCode::OK, "requested {requested:?}");
        let sheet: SheetData = response.json().await.expect("Failed to parse JSON");
        assert_eq!(sheet, expected, "requested {requested:?}");
    }
}

#[tokio::test]
async fn test_empty_cells_are_omitted() {
    let base = spawn_server().await;

    let mut book = XlsxBuilder::new();
    let underline = book.add_style(StyleSpec {
        underline: true,
        ..Default::default()
    });
    let sheet = book.add_sheet("Sparse");
    // 3x3 occupied rectangle with three values and one styled blank
    book.text(sheet, "A1", "corner")
        .set(sheet, "B2", FixtureValue::Blank, underline)
        .set(sheet, "C2", FixtureValue::Text("mid".to_string()), underline)
        .set(sheet, "C3", FixtureValue::Bool(false), 0);

    let sheet: SheetData = analyze(&base, book.build(), None)
        .await
        .json()
        .await
        .expect("Failed to parse JSON");
    let addresses: Vec<&str> = sheet.cells.iter().map(|c| c.address.as_str()).collect();
    assert_eq!(addresses, vec!["A1", "C2", "C3"]);
    assert_eq!(sheet.cells[2].content, "False");
    assert_eq!(
        sheet.cells[1].style.text_decoration,
        Some(sheetstyle_core::TextDecoration::Underline)
    );
}

#[tokio::test]
async fn test_analyze_markdown() {
    let base = spawn_server().await;

    let form = Form::new().part("file", file_part(hello_workbook()));
    let response = reqwest::Client::new()
        .post(format!("{base}/api/analyze-sheet/markdown"))
        .multipart(form)
        .send()
        .await
        .expect("Failed to send markdown request");
    assert_eq!(response.status(), StatusCode::OK);

    let content_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    assert!(content_type.starts_with("text/markdown"));

    let body = response.text().await.expect("Failed to read body");
    assert!(body.starts_with("# Sheet: Sheet1\n"));
    assert!(body.contains("| A1 | Hello | backgroundColor: #FF0000, fontWeight: bold |"));
}

#[tokio::test]
async fn test_non_spreadsheet_upload_is_rejected() {
    let base = spawn_server().await;
    let client = reqwest::Client::new();

    for endpoint in ["/api/sheets", "/api/analyze-sheet"] {
        let form = Form::new().part(
            "file",
            Part::bytes(b"%PDF-1.4 this is not a workbook".to_vec()).file_name("doc.pdf"),
        );
        let response = client
            .post(format!("{base}{endpoint}"))
            .multipart(form)
            .send()
            .await
            .expect("Failed to send request");
        assert_eq!(
            response.status(),
            StatusCode::UNPROCESSABLE_ENTITY,
            "endpoint {endpoint}"
        );
        let body = response.text().await.expect("Failed to read body");
        assert!(body.contains("Failed to open workbook"));
    }

    // still serving
    let response = client
        .get(format!("{base}/health"))
        .send()
        .await
        .expect("Failed to send health check request");
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_missing_file_field() {
    let base = spawn_server().await;

    let form = Form::new().text("sheet_name", "Sheet1");
    let response = reqwest::Client::new()
        .post(format!("{base}/api/analyze-sheet"))
        .multipart(form)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = response.text().await.expect("Failed to read body");
    assert!(body.contains("file"));
}

#[tokio::test]
async fn test_non_multipart_body_is_client_error() {
    let base = spawn_server().await;

    let response = reqwest::Client::new()
        .post(format!("{base}/api/sheets"))
        .body("plain text")
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_client_error());
}

#[tokio::test]
async fn test_cors_allows_any_origin_with_credentials() {
    let base = spawn_server().await;

    let response = reqwest::Client::new()
        .request(reqwest::Method::OPTIONS, format!("{base}/api/analyze-sheet"))
        .header("Origin", "http://localhost:3000")
        .header("Access-Control-Request-Method", "POST")
        .header("Access-Control-Request-Headers", "content-type")
        .send()
        .await
        .expect("Failed to send preflight request");
    assert!(response.status().is_success());

    let headers = response.headers();
    assert_eq!(
        headers
            .get("access-control-allow-origin")
            .and_then(|v| v.to_str().ok()),
        Some("http://localhost:3000")
    );
    assert_eq!(
        headers
            .get("access-control-allow-credentials")
            .and_then(|v| v.to_str().ok()),
        Some("true")
    );
}
