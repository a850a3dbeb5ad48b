use strata::{Mapped, ZERO_TIME};
use time::PrimitiveDateTime;

#[derive(Mapped, Default, Debug, Clone, PartialEq)]
#[strata(table = "users")]
pub struct User {
    pub id: i64,
    pub name: String,
    #[strata("update_zero:true")]
    pub show: i32,
    pub email: Option<String>,
    #[strata("-")]
    pub cached: Vec<String>,
}

#[derive(Mapped, Debug, Clone, PartialEq)]
#[strata(table = "posts as p")]
pub struct Post {
    pub id: u64,
    pub title: String,
    pub score: f64,
    pub published: bool,
    pub body: Vec<u8>,
    pub created_at: PrimitiveDateTime,
}

impl Default for Post {
    fn default() -> Self {
        Self {
            id: 0,
            title: String::new(),
            score: 0.0,
            published: false,
            body: Vec::new(),
            created_at: ZERO_TIME,
        }
    }
}

#[derive(Mapped, Default, Debug, Clone, PartialEq)]
pub struct Sub {
    pub sub_id: i64,
    pub label: String,
}

/// No table of its own, it takes the one of its extension.
#[derive(Mapped, Default, Debug, Clone, PartialEq)]
#[strata(anonymous)]
pub struct WithSub {
    #[strata("extend")]
    pub sub: Sub,
    pub total: i64,
}

#[derive(Mapped, Default, Debug, Clone, PartialEq)]
pub struct Customer {
    #[strata("col:name")]
    pub customer_name: String,
}

#[derive(Mapped, Default, Debug, Clone, PartialEq)]
#[strata(table = "orders as o", primary_key = "order_id")]
pub struct Order {
    pub order_id: i64,
    pub amount: f64,
    #[strata("extend:customers as c")]
    pub customer: Customer,
    #[strata("col:note;use_alias:false")]
    pub note: Option<String>,
}
