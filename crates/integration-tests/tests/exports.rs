//! CSV downloads for the list screens.

#![allow(clippy::unwrap_used)]

use axum::http::header;
use axum::response::IntoResponse;
use chrono::{FixedOffset, NaiveDate, TimeZone, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use cs_console_admin::db::{Complaint, Hold, Product};
use cs_console_admin::services::{CsvDownload, build_report, to_csv};
use cs_console_core::{DateWindow, TimeRange};

fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn complaint(text: &str) -> Complaint {
    Complaint {
        id: Uuid::nil(),
        nomor_pelanggan: Some(628_123_456_789),
        nama_pelanggan: Some("Rina".to_string()),
        keluhan: Some(text.to_string()),
        sudah_ditangani: false,
        datetime: Utc.with_ymd_and_hms(2024, 4, 1, 3, 0, 0).unwrap(),
        updated_at: None,
    }
}

#[test]
fn test_complaint_export_quotes_awkward_text() {
    let csv = to_csv(&[complaint("Paket \"rusak\", minta retur")]).unwrap();

    let mut lines = csv.split("\r\n");
    assert_eq!(
        lines.next(),
        Some("id,nomor_pelanggan,nama_pelanggan,keluhan,sudah_ditangani,datetime")
    );
    assert_eq!(
        lines.next(),
        Some(
            "00000000-0000-0000-0000-000000000000,628123456789,Rina,\
             \"Paket \"\"rusak\"\", minta retur\",false,2024-04-01T03:00:00+00:00"
        )
    );
    assert_eq!(lines.next(), Some(""));
}

#[test]
fn test_multiline_message_stays_one_record() {
    let csv = to_csv(&[complaint("baris satu\nbaris dua")]).unwrap();

    let mut reader = csv::ReaderBuilder::new().from_reader(csv.as_bytes());
    let records: Vec<_> = reader.records().collect::<Result<_, _>>().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(&records[0][3], "baris satu\nbaris dua");
}

#[test]
fn test_missing_product_fields_export_empty() {
    let at = Utc.with_ymd_and_hms(2024, 4, 1, 3, 0, 0).unwrap();
    let product = Product {
        id: "prd-1".to_string(),
        product_id: Some(7),
        nama: "Serum Cozmeed".to_string(),
        deskripsi: None,
        kategori: None,
        harga: Some(Decimal::new(125_000, 0)),
        stok: None,
        berat: None,
        ukuran: None,
        warna: None,
        created_at: at,
        updated_at: at,
    };

    let csv = to_csv(&[product]).unwrap();
    let row = csv.split("\r\n").nth(1).unwrap();
    assert!(row.starts_with("prd-1,7,Serum Cozmeed,,,125000,,,,,"));
}

#[test]
fn test_empty_list_exports_header_only() {
    let csv = to_csv::<Hold>(&[]).unwrap();
    assert_eq!(
        csv,
        "phone_number,is_hold,customer_journey,last_message,created_at,updated_at\r\n"
    );
}

#[test]
fn test_download_response_headers() {
    let download = CsvDownload::build("complaints", day(2024, 4, 2), &[complaint("Telat")]).unwrap();
    assert_eq!(download.filename, "complaints-20240402.csv");

    let response = download.into_response();
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "text/csv; charset=utf-8"
    );
    assert_eq!(
        response.headers().get(header::CONTENT_DISPOSITION).unwrap(),
        "attachment; filename=\"complaints-20240402.csv\""
    );
}

#[test]
fn test_token_export_has_one_row_per_day() {
    let window = DateWindow::new(day(2024, 4, 1), day(2024, 4, 3));
    let offset = FixedOffset::east_opt(7 * 3600).unwrap();
    let report = build_report(TimeRange::SevenDays, window, offset, &[]);

    let csv = to_csv(&report.days).unwrap();
    assert_eq!(
        csv,
        "date,input_token,output_token,total\r\n\
         2024-04-01,0,0,0\r\n\
         2024-04-02,0,0,0\r\n\
         2024-04-03,0,0,0\r\n"
    );
}
