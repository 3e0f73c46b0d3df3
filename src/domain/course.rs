use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize)]
pub struct Course {
    pub id: Uuid,
    pub title: String,
    pub price: Option<Decimal>,
}

impl Course {
    /// Price the course can be sold at, if it has a positive one.
    pub fn sale_price(&self) -> Option<Decimal> {
        self.price.filter(|p| *p > Decimal::ZERO)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn course(price: Option<Decimal>) -> Course {
        Course {
            id: Uuid::new_v4(),
            title: "Rust for payments".to_string(),
            price,
        }
    }

    #[test]
    fn positive_price_is_sellable() {
        let c = course(Some(Decimal::new(4999, 2)));
        assert_eq!(c.sale_price(), Some(Decimal::new(4999, 2)));
    }

    #[test]
    fn zero_negative_or_missing_price_is_not_sellable() {
        assert_eq!(course(Some(Decimal::ZERO)).sale_price(), None);
        assert_eq!(course(Some(Decimal::new(-100, 2))).sale_price(), None);
        assert_eq!(course(None).sale_price(), None);
    }
}
