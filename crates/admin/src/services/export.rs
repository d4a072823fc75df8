//! CSV export for the list screens.
//!
//! One header line plus one line per row. Fields that contain a comma, a
//! quote or a line break are quoted, and inner quotes doubled (RFC 4180).

use axum::{
    http::header,
    response::{IntoResponse, Response},
};
use chrono::NaiveDate;
use thiserror::Error;

use cs_console_core::OrderStatus;

use crate::db::{Complaint, Hold, Journey, OrderWithCart, Product, Promo};
use crate::services::token_usage::TokenDay;

/// Errors from CSV export.
#[derive(Debug, Error)]
pub enum ExportError {
    /// The CSV writer failed.
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    /// Flushing the in-memory buffer failed.
    #[error("failed to flush csv output: {0}")]
    Flush(String),
}

/// A row type that can be written as CSV.
pub trait CsvRecord {
    /// Column headers, in field order.
    const HEADERS: &'static [&'static str];

    /// The row's fields, in header order.
    fn fields(&self) -> Vec<String>;
}

/// Serialize `rows` to CSV text.
///
/// # Errors
///
/// Returns `ExportError` if the writer fails.
pub fn to_csv<T: CsvRecord>(rows: &[T]) -> Result<String, ExportError> {
    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::CRLF)
        .from_writer(Vec::new());

    writer.write_record(T::HEADERS)?;
    for row in rows {
        writer.write_record(row.fields())?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| ExportError::Flush(e.error().to_string()))?;
    String::from_utf8(bytes).map_err(|e| ExportError::Flush(e.to_string()))
}

/// Download filename for a screen's export, e.g. `holds-20240401.csv`.
#[must_use]
pub fn export_filename(screen: &str, day: NaiveDate) -> String {
    format!("{screen}-{}.csv", day.format("%Y%m%d"))
}

/// A CSV file response.
#[derive(Debug, Clone)]
pub struct CsvDownload {
    pub filename: String,
    pub body: String,
}

impl CsvDownload {
    /// Build a download of `rows` for `screen`.
    ///
    /// # Errors
    ///
    /// Returns `ExportError` if serialization fails.
    pub fn build<T: CsvRecord>(screen: &str, day: NaiveDate, rows: &[T]) -> Result<Self, ExportError> {
        Ok(Self {
            filename: export_filename(screen, day),
            body: to_csv(rows)?,
        })
    }
}

impl IntoResponse for CsvDownload {
    fn into_response(self) -> Response {
        (
            [
                (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{}\"", self.filename),
                ),
            ],
            self.body,
        )
            .into_response()
    }
}

fn opt<T: ToString>(value: Option<&T>) -> String {
    value.map(ToString::to_string).unwrap_or_default()
}

fn opt_str(value: Option<&str>) -> String {
    value.unwrap_or_default().to_string()
}

// =============================================================================
// Row formats
// =============================================================================

impl CsvRecord for Hold {
    const HEADERS: &'static [&'static str] = &[
        "phone_number",
        "is_hold",
        "customer_journey",
        "last_message",
        "created_at",
        "updated_at",
    ];

    fn fields(&self) -> Vec<String> {
        vec![
            self.phone_number.clone(),
            self.is_hold.to_string(),
            opt_str(self.customer_journey.as_deref()),
            opt_str(self.last_message.as_deref()),
            self.created_at.to_rfc3339(),
            self.updated_at.to_rfc3339(),
        ]
    }
}

impl CsvRecord for Product {
    const HEADERS: &'static [&'static str] = &[
        "id",
        "product_id",
        "nama",
        "deskripsi",
        "kategori",
        "harga",
        "stok",
        "berat",
        "ukuran",
        "warna",
        "created_at",
        "updated_at",
    ];

    fn fields(&self) -> Vec<String> {
        vec![
            self.id.clone(),
            opt(self.product_id.as_ref()),
            self.nama.clone(),
            opt_str(self.deskripsi.as_deref()),
            opt_str(self.kategori.as_deref()),
            opt(self.harga.as_ref()),
            opt(self.stok.as_ref()),
            opt(self.berat.as_ref()),
            opt_str(self.ukuran.as_deref()),
            opt_str(self.warna.as_deref()),
            self.created_at.to_rfc3339(),
            self.updated_at.to_rfc3339(),
        ]
    }
}

impl CsvRecord for Promo {
    const HEADERS: &'static [&'static str] = &[
        "id",
        "nama",
        "judul_promo",
        "jenis",
        "deskripsi",
        "product_id",
        "product_nama",
        "syarat_ketentuan",
        "tanggal_mulai",
        "tanggal_selesai",
    ];

    fn fields(&self) -> Vec<String> {
        vec![
            self.id.clone(),
            self.nama.clone(),
            opt_str(self.judul_promo.as_deref()),
            opt_str(self.jenis.as_deref()),
            opt_str(self.deskripsi.as_deref()),
            opt_str(self.product_id.as_deref()),
            opt_str(self.product_nama.as_deref()),
            opt_str(self.syarat_ketentuan.as_deref()),
            opt(self.tanggal_mulai.as_ref()),
            opt(self.tanggal_selesai.as_ref()),
        ]
    }
}

impl CsvRecord for OrderWithCart {
    const HEADERS: &'static [&'static str] = &[
        "id",
        "nama_penerima",
        "alamat_penerima",
        "no_hp_penerima",
        "status",
        "ringkasan",
        "total_pembayaran",
        "created_at",
        "updated_at",
    ];

    fn fields(&self) -> Vec<String> {
        vec![
            self.id.clone(),
            opt_str(self.nama_penerima.as_deref()),
            opt_str(self.alamat_penerima.as_deref()),
            opt_str(self.no_hp_penerima.as_deref()),
            self.status
                .as_ref()
                .map(OrderStatus::as_db)
                .unwrap_or_default()
                .to_string(),
            self.ringkasan.clone(),
            self.total_pembayaran.amount().to_string(),
            self.created_at.to_rfc3339(),
            self.updated_at.to_rfc3339(),
        ]
    }
}

impl CsvRecord for Complaint {
    const HEADERS: &'static [&'static str] = &[
        "id",
        "nomor_pelanggan",
        "nama_pelanggan",
        "keluhan",
        "sudah_ditangani",
        "datetime",
    ];

    fn fields(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            opt(self.nomor_pelanggan.as_ref()),
            opt_str(self.nama_pelanggan.as_deref()),
            opt_str(self.keluhan.as_deref()),
            self.sudah_ditangani.to_string(),
            self.datetime.to_rfc3339(),
        ]
    }
}

impl CsvRecord for Journey {
    const HEADERS: &'static [&'static str] = &[
        "id",
        "phone_number",
        "customer_journey",
        "follow_up",
        "message",
        "message_id",
        "session",
        "created_at",
    ];

    fn fields(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            opt_str(self.phone_number.as_deref()),
            self.customer_journey.clone(),
            self.follow_up.to_string(),
            opt_str(self.message.as_deref()),
            opt_str(self.message_id.as_deref()),
            opt_str(self.session.as_deref()),
            self.created_at.to_rfc3339(),
        ]
    }
}

impl CsvRecord for TokenDay {
    const HEADERS: &'static [&'static str] = &["date", "input_token", "output_token", "total"];

    fn fields(&self) -> Vec<String> {
        vec![
            self.day.to_string(),
            self.input.to_string(),
            self.output.to_string(),
            self.total.to_string(),
        ]
    }
}
