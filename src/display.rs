//! Plain-text rendering of the status panel and the order table.

use crate::events::{ClientEvent, ClientEventPayload};
use crate::orders::{Order, Pagination};
use crate::status::ProcessingStatus;
use crate::upload::UploadSession;

const ORDER_COLUMNS: [&str; 8] = [
    "Order ID",
    "Customer ID",
    "Product Name",
    "Product ID",
    "Quantity",
    "Price",
    "Order Date",
    "Category",
];

pub fn format_status(status: &ProcessingStatus) -> String {
    let rows = [
        ("Status", status.status.to_string()),
        ("Total Orders", status.total_orders.to_string()),
        ("Duplicate Orders", status.duplicate_orders_count.to_string()),
        (
            "Validation Failed Orders",
            status.validation_failed_orders_count.to_string(),
        ),
        (
            "Successfully Processed Orders",
            status.successfully_processed_count.to_string(),
        ),
    ];

    let width = rows.iter().map(|(label, _)| label.len()).max().unwrap_or(0);
    rows.iter()
        .map(|(label, value)| format!("{:<width$}  {}", format!("{}:", label), value, width = width + 1))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn format_progress(session: &UploadSession) -> String {
    let line = format!(
        "{} ({} bytes): {}/{} chunks sent",
        session.original_name, session.file_size, session.chunks_sent, session.total_chunks
    );
    if session.is_fully_sent() {
        format!("{}, complete", line)
    } else {
        line
    }
}

fn order_cells(order: &Order) -> [String; 8] {
    [
        order.id.to_string(),
        order.customer_id.to_string(),
        order.product_name.clone(),
        order.product_id.to_string(),
        order.quantity.to_string(),
        format!("{:.2}", order.price),
        order.order_date.clone(),
        order.category.clone(),
    ]
}

pub fn format_orders_table(orders: &[Order]) -> String {
    if orders.is_empty() {
        return "No orders found".to_string();
    }

    let rows: Vec<[String; 8]> = orders.iter().map(order_cells).collect();
    let mut widths = ORDER_COLUMNS.map(str::len);
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row.iter()) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let render = |cells: &[String]| {
        cells
            .iter()
            .zip(widths.iter())
            .map(|(cell, width)| format!("{:<width$}", cell, width = *width))
            .collect::<Vec<_>>()
            .join(" | ")
            .trim_end()
            .to_string()
    };

    let header: Vec<String> = ORDER_COLUMNS.iter().map(|c| c.to_string()).collect();
    let separator = widths
        .iter()
        .map(|w| "-".repeat(*w))
        .collect::<Vec<_>>()
        .join("-+-");

    let mut lines = Vec::with_capacity(rows.len() + 2);
    lines.push(render(&header[..]));
    lines.push(separator);
    lines.extend(rows.iter().map(|row| render(&row[..])));
    lines.join("\n")
}

pub fn format_pagination(pagination: &Pagination) -> String {
    let mut line = format!("Page {} of {}", pagination.page, pagination.total_pages);
    if pagination.can_go_previous() {
        line = format!("[prev] {}", line);
    }
    if pagination.can_go_next() {
        line.push_str(" [next]");
    }
    line
}

/// One progress line per event; listing events are left to the table output
pub fn format_event(event: &ClientEvent) -> Option<String> {
    match &event.payload {
        ClientEventPayload::UploadStarted {
            file_name,
            file_size,
            total_chunks,
            ..
        } => Some(format!(
            "Uploading {} ({} bytes, {} chunks)",
            file_name, file_size, total_chunks
        )),
        ClientEventPayload::ChunkSent {
            chunk_index,
            total_chunks,
            ..
        } => Some(format!("  chunk {}/{} sent", chunk_index + 1, total_chunks)),
        ClientEventPayload::UploadFinished { chunks_sent, .. } => {
            Some(format!("Upload finished ({} chunks)", chunks_sent))
        }
        ClientEventPayload::UploadAborted {
            failed_chunk,
            reason,
            ..
        } => Some(format!("Upload aborted at chunk {}: {}", failed_chunk, reason)),
        ClientEventPayload::StatusUpdated { status, .. } => Some(format!(
            "Status: {} ({} of {} processed)",
            status.status, status.successfully_processed_count, status.total_orders
        )),
        ClientEventPayload::FetchFailed { page, reason } => {
            Some(format!("Could not load orders page {}: {}", page, reason))
        }
        ClientEventPayload::OrdersFetched { .. } => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::status::OrderProcessingStatus;

    fn order(id: i64, name: &str) -> Order {
        Order {
            id,
            customer_id: 7,
            product_id: 42,
            product_name: name.to_string(),
            quantity: 2,
            price: 9.5,
            order_date: "2024-01-15".to_string(),
            category: "Books".to_string(),
        }
    }

    #[test]
    fn test_status_block_labels() {
        let text = format_status(&ProcessingStatus {
            status: OrderProcessingStatus::Completed,
            total_orders: 10,
            duplicate_orders_count: 1,
            validation_failed_orders_count: 2,
            successfully_processed_count: 7,
        });

        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 5);
        assert!(lines[0].starts_with("Status:"));
        assert!(lines[0].ends_with("COMPLETED"));
        assert!(lines[2].starts_with("Duplicate Orders:"));
        assert!(lines[4].ends_with(" 7"));
    }

    #[test]
    fn test_progress_marks_complete() {
        let mut session = UploadSession::new("orders.csv", 2500, 3);
        session.chunks_sent = 2;
        assert_eq!(
            format_progress(&session),
            "orders.csv (2500 bytes): 2/3 chunks sent"
        );

        session.chunks_sent = 3;
        assert!(format_progress(&session).ends_with("3/3 chunks sent, complete"));
    }

    #[test]
    fn test_empty_table() {
        assert_eq!(format_orders_table(&[]), "No orders found");
    }

    #[test]
    fn test_table_columns_align() {
        let text = format_orders_table(&[order(1, "Pen"), order(1002, "Encyclopedia Set")]);
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("Order ID"));
        assert!(lines[0].ends_with("Category"));
        assert!(lines[3].contains("Encyclopedia Set"));
        assert!(lines[2].contains("9.50"));

        let column = lines[0].find("Customer ID").unwrap();
        assert_eq!(lines[2].find(" | ").unwrap() + 3, column);
        assert_eq!(lines[3].find(" | ").unwrap() + 3, column);
    }

    #[test]
    fn test_event_lines() {
        let event = |payload| ClientEvent {
            sequence: 1,
            timestamp: chrono::Utc::now(),
            payload,
        };

        let sent = event(ClientEventPayload::ChunkSent {
            file_identifier: "id_orders.csv".to_string(),
            chunk_index: 0,
            total_chunks: 3,
        });
        assert_eq!(format_event(&sent).as_deref(), Some("  chunk 1/3 sent"));

        let fetched = event(ClientEventPayload::OrdersFetched {
            page: 1,
            total_pages: 1,
            count: 0,
        });
        assert_eq!(format_event(&fetched), None);
    }

    #[test]
    fn test_pagination_line() {
        assert_eq!(
            format_pagination(&Pagination { page: 1, total_pages: 1 }),
            "Page 1 of 1"
        );
        assert_eq!(
            format_pagination(&Pagination { page: 2, total_pages: 3 }),
            "[prev] Page 2 of 3 [next]"
        );
        assert_eq!(
            format_pagination(&Pagination { page: 3, total_pages: 3 }),
            "[prev] Page 3 of 3"
        );
    }
}
