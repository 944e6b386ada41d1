use serde::{Deserialize, Serialize};

/// One processed order row as returned by the listing endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: i64,
    pub customer_id: i64,
    pub product_id: i64,
    pub product_name: String,
    pub quantity: i64,
    pub price: f64,
    pub order_date: String,
    pub category: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderPage {
    pub orders: Vec<Order>,
    pub page: u32,
    #[serde(rename = "totalNumberOfPages")]
    pub total_pages: u32,
}

/// Page position plus the rule for which navigation is allowed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: u32,
    pub total_pages: u32,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: 1,
            total_pages: 1,
        }
    }
}

impl Pagination {
    pub fn contains(&self, page: u32) -> bool {
        page >= 1 && page <= self.total_pages
    }

    pub fn can_go_previous(&self) -> bool {
        self.page > 1
    }

    pub fn can_go_next(&self) -> bool {
        self.page < self.total_pages
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_listing() {
        let json = r#"{
            "orders": [{
                "id": 7,
                "customer_id": 42,
                "product_id": 1001,
                "product_name": "Desk Lamp",
                "quantity": 2,
                "price": 19.99,
                "order_date": "2024-03-01",
                "category": "Home"
            }],
            "page": 2,
            "totalNumberOfPages": 3
        }"#;

        let page: OrderPage = serde_json::from_str(json).unwrap();
        assert_eq!(page.page, 2);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.orders[0].product_name, "Desk Lamp");
        assert_eq!(page.orders[0].price, 19.99);
    }

    #[test]
    fn test_button_rules() {
        let first = Pagination {
            page: 1,
            total_pages: 3,
        };
        assert!(!first.can_go_previous());
        assert!(first.can_go_next());

        let middle = Pagination {
            page: 2,
            total_pages: 3,
        };
        assert!(middle.can_go_previous());
        assert!(middle.can_go_next());

        let last = Pagination {
            page: 3,
            total_pages: 3,
        };
        assert!(last.can_go_previous());
        assert!(!last.can_go_next());

        let only = Pagination::default();
        assert!(!only.can_go_previous());
        assert!(!only.can_go_next());
    }

    #[test]
    fn test_contains() {
        let p = Pagination {
            page: 1,
            total_pages: 3,
        };
        assert!(!p.contains(0));
        assert!(p.contains(1));
        assert!(p.contains(3));
        assert!(!p.contains(4));
    }
}
