use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderProcessingStatus {
    Pending,
    Processing,
    Completed,
    /// Forward-compatible catch-all for states the service adds later
    #[serde(other)]
    Unknown,
}

impl OrderProcessingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderProcessingStatus::Pending => "PENDING",
            OrderProcessingStatus::Processing => "PROCESSING",
            OrderProcessingStatus::Completed => "COMPLETED",
            OrderProcessingStatus::Unknown => "UNKNOWN",
        }
    }

    /// No further state change is expected after this
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderProcessingStatus::Completed)
    }
}

impl std::fmt::Display for OrderProcessingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Server's view of one uploaded file. Replaced wholesale on every poll.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessingStatus {
    pub status: OrderProcessingStatus,
    #[serde(default)]
    pub total_orders: u64,
    #[serde(default)]
    pub duplicate_orders_count: u64,
    #[serde(default)]
    pub validation_failed_orders_count: u64,
    #[serde(default)]
    pub successfully_processed_count: u64,
}

impl ProcessingStatus {
    pub fn is_completed(&self) -> bool {
        self.status.is_terminal()
    }

    /// Server-side guarantee once completed; only checked, never enforced
    pub fn counts_consistent(&self) -> bool {
        self.duplicate_orders_count
            + self.validation_failed_orders_count
            + self.successfully_processed_count
            <= self.total_orders
    }
}
