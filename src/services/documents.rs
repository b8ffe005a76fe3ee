/*!
 * Proof-of-delivery documents.
 *
 * A small PDF 1.4 writer: standard Helvetica fonts, US Letter pages and
 * one text line per entry. That is all the shipment summary needs, so no
 * layout engine is involved.
 */

use bytes::Bytes;
use chrono::{DateTime, Utc};
use std::fmt::Write as _;

use crate::services::views::ShipmentRecord;

const PAGE_WIDTH: u32 = 612;
const PAGE_HEIGHT: u32 = 792;
const MARGIN_X: u32 = 30;
const TOP: u32 = PAGE_HEIGHT - 40;
const BOTTOM: u32 = 40;
const LINE_HEIGHT: u32 = 16;

enum Entry {
    Title(String),
    Heading(String),
    Line(String),
}

/// Accumulates text lines and paginates them on `finish`
pub struct PdfDocument {
    title: String,
    entries: Vec<Entry>,
}

impl PdfDocument {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            entries: Vec::new(),
        }
    }

    pub fn title_line(&mut self, text: impl Into<String>) -> &mut Self {
        self.entries.push(Entry::Title(text.into()));
        self
    }

    pub fn heading(&mut self, text: impl Into<String>) -> &mut Self {
        self.entries.push(Entry::Heading(text.into()));
        self
    }

    pub fn line(&mut self, text: impl Into<String>) -> &mut Self {
        self.entries.push(Entry::Line(text.into()));
        self
    }

    fn page_streams(&self) -> Vec<String> {
        let mut pages = Vec::new();
        let mut current = String::new();
        let mut y = TOP;

        for entry in &self.entries {
            if y < BOTTOM {
                pages.push(std::mem::take(&mut current));
                y = TOP;
            }
            let (font, size, text) = match entry {
                Entry::Title(t) => ("F2", 14, t),
                Entry::Heading(t) => ("F2", 11, t),
                Entry::Line(t) => ("F1", 10, t),
            };
            let _ = writeln!(
                current,
                "BT /{} {} Tf {} {} Td ({}) Tj ET",
                font,
                size,
                MARGIN_X,
                y,
                escape_pdf_text(text)
            );
            y = y.saturating_sub(if matches!(entry, Entry::Title(_)) {
                LINE_HEIGHT + 4
            } else {
                LINE_HEIGHT
            });
        }
        pages.push(current);
        pages
    }

    /// Serialize with a cross-reference table
    pub fn finish(&self) -> Vec<u8> {
        let streams = self.page_streams();
        let page_count = streams.len();

        // 1 catalog, 2 pages, 3-4 fonts, 5 info, then (page, content) pairs
        let first_page_obj = 6;
        let kids = (0..page_count)
            .map(|i| format!("{} 0 R", first_page_obj + i * 2))
            .collect::<Vec<_>>()
            .join(" ");

        let mut objects: Vec<String> = vec![
            "<< /Type /Catalog /Pages 2 0 R >>".to_string(),
            format!("<< /Type /Pages /Kids [{}] /Count {} >>", kids, page_count),
            "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica /Encoding /WinAnsiEncoding >>"
                .to_string(),
            "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica-Bold /Encoding /WinAnsiEncoding >>"
                .to_string(),
            format!(
                "<< /Title ({}) /Producer (backoffice-api) >>",
                escape_pdf_text(&self.title)
            ),
        ];

        for (i, stream) in streams.iter().enumerate() {
            let content_obj = first_page_obj + i * 2 + 1;
            objects.push(format!(
                "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {} {}] /Resources << /Font << /F1 3 0 R /F2 4 0 R >> >> /Contents {} 0 R >>",
                PAGE_WIDTH, PAGE_HEIGHT, content_obj
            ));
            objects.push(format!(
                "<< /Length {} >>\nstream\n{}endstream",
                stream.len(),
                stream
            ));
        }

        let mut out = String::from("%PDF-1.4\n");
        let mut offsets = Vec::with_capacity(objects.len());
        for (i, body) in objects.iter().enumerate() {
            offsets.push(out.len());
            let _ = write!(out, "{} 0 obj\n{}\nendobj\n", i + 1, body);
        }

        let xref_offset = out.len();
        let _ = write!(out, "xref\n0 {}\n0000000000 65535 f \n", objects.len() + 1);
        for offset in offsets {
            let _ = write!(out, "{:010} 00000 n \n", offset);
        }
        let _ = write!(
            out,
            "trailer\n<< /Size {} /Root 1 0 R /Info 5 0 R >>\nstartxref\n{}\n%%EOF\n",
            objects.len() + 1,
            xref_offset
        );

        out.into_bytes()
    }
}

/// Escapes delimiters; characters outside printable ASCII become `?`
fn escape_pdf_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '(' => out.push_str("\\("),
            ')' => out.push_str("\\)"),
            ' '..='~' => out.push(c),
            _ => out.push('?'),
        }
    }
    out
}

fn opt(value: Option<&str>) -> &str {
    value.unwrap_or("None")
}

fn flag(value: bool) -> &'static str {
    if value {
        "Yes"
    } else {
        "No"
    }
}

fn timestamp(value: Option<DateTime<Utc>>) -> String {
    value
        .map(|v| v.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| "None".to_string())
}

/// Object name of a shipment's proof of delivery
pub fn proof_of_delivery_name(shipment_id: uuid::Uuid) -> String {
    format!(
        "{}/shipment_details_{}.pdf",
        crate::services::storage::PROOF_OF_DELIVERY,
        shipment_id
    )
}

/// Renders the "Shipment Details" summary handed over at delivery
pub fn render_shipment_details(record: &ShipmentRecord) -> Bytes {
    let shipment = &record.shipment;
    let container = &record.container;

    let mut pdf = PdfDocument::new(format!("Shipment Details {}", shipment.id));
    pdf.title_line("Shipment Details");

    pdf.heading("Container Details")
        .line(format!("Container: {}", container.container_number))
        .line(format!("Container Size: {}", opt(container.size.as_deref())))
        .line(format!("Container Type: {}", opt(container.container_type.as_deref())))
        .line(format!("Container Owner: {}", opt(container.owner.as_deref())))
        .line(format!("Container Chassis Number: {}", opt(container.chassis_number.as_deref())))
        .line(format!("Container Chassis Type: {}", opt(container.chassis_type.as_deref())))
        .line(format!("Container Chassis Size: {}", opt(container.chassis_size.as_deref())))
        .line(format!("Container SCAC: {}", opt(container.scac.as_deref())))
        .line(format!("Container Genset Number: {}", opt(container.genset_number.as_deref())))
        .line(format!("Container Temperature: {}", opt(container.temperature.as_deref())))
        .line(format!(
            "Hazmat: {}  Overweight: {}  Overheight: {}  Hot: {}  Genset: {}  Liquor: {}",
            flag(container.hazmat),
            flag(container.overweight),
            flag(container.overheight),
            flag(container.hot),
            flag(container.genset),
            flag(container.liquor)
        ));

    pdf.heading("Customer Details");
    if let Some(customer) = &record.customer {
        pdf.line(format!("Customer: {}", opt(customer.associate_company_name.as_deref())))
            .line(format!("Customer Name: {}", customer.responsible_person_name))
            .line(format!("Customer Email: {}", customer.email))
            .line(format!("Customer Address: {}", customer.address))
            .line(format!("Customer Phone Number: {}", customer.phone));
    }

    pdf.heading("Driver Details");
    if let Some(driver) = &record.driver {
        pdf.line(format!("Driver Name: {}", driver.user.full_name()))
            .line(format!("Driver Company: {}", opt(driver.profile.company_name.as_deref())))
            .line(format!("Driver Email: {}", driver.user.email))
            .line(format!("Driver Phone Number: {}", opt(driver.user.phone_number.as_deref())));
    }

    pdf.heading("Warehouse Details");
    if let Some(warehouse) = &record.warehouse {
        match &warehouse.company {
            Some(company) => {
                pdf.line(format!("Warehouse: {}", company.company_name))
                    .line(format!(
                        "Warehouse Phone Number: {}",
                        opt(company.company_phone_number.as_deref())
                    ))
                    .line(format!("Warehouse Email: {}", company.company_email));
            }
            None => {
                pdf.line(format!("Warehouse: {}", warehouse.user.full_name()))
                    .line(format!("Warehouse Email: {}", warehouse.user.email));
            }
        }
    }

    pdf.line(format!(
        "Shipment Assigned Date: {}",
        shipment
            .assigned_date
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| "N/A".to_string())
    ))
    .line(format!("Pickup Location: {}", opt(shipment.pickup_location.as_deref())))
    .line(format!("Delivery Location: {}", opt(shipment.delivery_location.as_deref())))
    .line(format!("Return Location: {}", opt(shipment.return_location.as_deref())))
    .line(format!("Driver Delivered At: {}", timestamp(shipment.driver_delivered_date)))
    .line(format!(
        "Warehouse Received At: {}",
        timestamp(shipment.warehouse_accepted_date)
    ));

    Bytes::from(pdf.finish())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn as_text(bytes: &[u8]) -> String {
        String::from_utf8_lossy(bytes).into_owned()
    }

    #[test]
    fn writes_a_well_formed_single_page() {
        let mut pdf = PdfDocument::new("Probe");
        pdf.title_line("Shipment Details").line("Container: (MSCU) 1\\2");
        let text = as_text(&pdf.finish());

        assert!(text.starts_with("%PDF-1.4\n"));
        assert!(text.trim_end().ends_with("%%EOF"));
        assert!(text.contains("/Count 1"));
        assert!(text.contains("(Container: \\(MSCU\\) 1\\\\2) Tj"));

        // startxref must point at the xref keyword
        let startxref: usize = text
            .rsplit("startxref\n")
            .next()
            .and_then(|tail| tail.lines().next())
            .and_then(|n| n.parse().ok())
            .unwrap();
        assert!(text[startxref..].starts_with("xref"));
    }

    #[test]
    fn long_documents_span_pages() {
        let mut pdf = PdfDocument::new("Long");
        for i in 0..120 {
            pdf.line(format!("line {}", i));
        }
        let text = as_text(&pdf.finish());
        assert!(text.contains("/Count 3"));
    }

    #[test]
    fn non_ascii_is_replaced() {
        assert_eq!(escape_pdf_text("Zoë"), "Zo?");
    }
}
