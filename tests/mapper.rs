mod resource {
    pub mod models;
}

#[cfg(test)]
mod tests {
    use crate::resource::models::{Customer, Order, Post, User, WithSub};
    use std::collections::HashMap;
    use strata::{
        Codec, FieldKind, Mapped, Mapper, MySqlSyntax, ParseMode, SnakeCase, StrataError, Value,
        ZERO_TIME,
    };
    use time::macros::datetime;

    fn kind(error: &strata::Error) -> Option<&StrataError> {
        StrataError::of(error)
    }

    #[test]
    fn columns_follow_member_order() {
        let mut user = User::default();
        let mut mapper = Mapper::new(&MySqlSyntax, &SnakeCase);
        mapper.parse_select(&mut user).unwrap();
        assert_eq!(mapper.table().name, "users");
        assert_eq!(mapper.columns(), ["id", "name", "show", "email"]);
        assert_eq!(mapper.primary_key(), "id");
        // Absent optional members are filled before a select.
        assert_eq!(user.email, Some(String::new()));
    }

    #[test]
    fn alias_prefixes_root_columns() {
        let mut post = Post::default();
        let mut mapper = Mapper::new(&MySqlSyntax, &SnakeCase);
        mapper.parse_select(&mut post).unwrap();
        assert_eq!(mapper.alias(), "p");
        assert_eq!(mapper.primary_key(), "p.id");
        assert_eq!(
            mapper.columns(),
            [
                "p.id",
                "p.title",
                "p.score",
                "p.published",
                "p.body",
                "p.created_at"
            ]
        );

        let mut mapper = Mapper::new(&MySqlSyntax, &SnakeCase);
        mapper.parse(&post, ParseMode::Insert).unwrap();
        assert_eq!(mapper.columns()[0], "id");
    }

    #[test]
    fn anonymous_struct_takes_the_extension_table() {
        let mut value = WithSub::default();
        let mut mapper = Mapper::new(&MySqlSyntax, &SnakeCase);
        mapper.parse_select(&mut value).unwrap();
        assert_eq!(mapper.table().name, "sub");
        assert_eq!(
            mapper.columns(),
            ["sub.sub_id", "sub.label", "sub.total"]
        );
    }

    #[test]
    fn extension_with_explicit_alias() {
        let mut order = Order::default();
        let mut mapper = Mapper::new(&MySqlSyntax, &SnakeCase);
        mapper.parse_select(&mut order).unwrap();
        assert_eq!(
            mapper.columns(),
            ["o.order_id", "o.amount", "c.name", "note"]
        );
        assert_eq!(mapper.primary_key(), "o.order_id");
    }

    #[test]
    fn extension_alias_from_join_map() {
        #[derive(strata::Mapped, Default)]
        #[strata(table = "invoices as i")]
        struct Invoice {
            pub id: i64,
            #[strata("extend:customers")]
            pub customer: Customer,
        }
        let join_map = HashMap::from([("customers".to_string(), "cu".to_string())]);
        let mut invoice = Invoice::default();
        let mut mapper = Mapper::new(&MySqlSyntax, &SnakeCase);
        mapper.set_join_map(&join_map);
        mapper.parse_select(&mut invoice).unwrap();
        assert_eq!(mapper.columns(), ["i.id", "cu.name"]);
    }

    #[test]
    fn scanned_values_are_assigned() {
        let mut post = Post::default();
        let mut mapper = Mapper::new(&MySqlSyntax, &SnakeCase);
        mapper.parse_select(&mut post).unwrap();
        let (columns, addresses) = mapper.get_column_and_address();
        assert_eq!(columns.len(), addresses.len());
        let row = [
            Value::Int64(Some(7)),
            Value::Varchar(Some("Hello".into())),
            Value::Float64(Some(4.5)),
            Value::Int64(Some(1)),
            Value::Blob(Some(b"\x01\x02".to_vec().into_boxed_slice())),
            Value::Blob(Some(b"2024-03-01 10:20:30".to_vec().into_boxed_slice())),
        ];
        for (address, value) in addresses.into_iter().zip(row) {
            *address = value;
        }
        mapper.assign_address_value(&mut post).unwrap();
        assert_eq!(
            post,
            Post {
                id: 7,
                title: "Hello".into(),
                score: 4.5,
                published: true,
                body: vec![1, 2],
                created_at: datetime!(2024-03-01 10:20:30),
            }
        );
    }

    #[test]
    fn insert_then_scan_round_trip() {
        let original = Post {
            id: 42,
            title: "Round trip".into(),
            score: 0.125,
            published: true,
            body: vec![0, 255, 7],
            created_at: datetime!(2023-11-05 08:09:10),
        };
        let mut mapper = Mapper::new(&MySqlSyntax, &SnakeCase);
        mapper.parse(&original, ParseMode::Insert).unwrap();
        let (insert_columns, values) = mapper.get_insert_column_and_values();

        // Text protocol: every value but the raw bytes comes back as text.
        let row = values.into_iter().map(|v| match v {
            Value::Blob(..) => v,
            v => Value::Varchar(Some(v.to_string())),
        });
        let mut scanned = Post::default();
        let mut mapper = Mapper::new(&MySqlSyntax, &SnakeCase);
        mapper.parse_select(&mut scanned).unwrap();
        {
            let (columns, addresses) = mapper.get_column_and_address();
            assert_eq!(
                columns,
                insert_columns
                    .iter()
                    .map(|v| format!("p.{v}"))
                    .collect::<Vec<_>>()
            );
            for (address, value) in addresses.into_iter().zip(row) {
                *address = value;
            }
        }
        mapper.assign_address_value(&mut scanned).unwrap();
        assert_eq!(scanned, original);
    }

    #[test]
    fn partial_scan_by_column() {
        let mut user = User {
            id: 3,
            name: "before".into(),
            ..Default::default()
        };
        let mut mapper = Mapper::new(&MySqlSyntax, &SnakeCase);
        mapper.parse_select(&mut user).unwrap();
        {
            let addresses = mapper.get_address_by_column(&[
                "name as n".to_string(),
                "missing".to_string(),
                "email".to_string(),
            ]);
            assert_eq!(addresses.len(), 3);
            assert!(addresses[1].is_none());
            let mut addresses = addresses.into_iter();
            if let Some(Some(name)) = addresses.next() {
                *name = Value::Varchar(Some("after".into()));
            }
            addresses.next();
            if let Some(Some(email)) = addresses.next() {
                *email = Value::Varchar(None);
            }
        }
        mapper.assign_address_value(&mut user).unwrap();
        assert_eq!(user.id, 3);
        assert_eq!(user.name, "after");
        assert_eq!(user.email, None);
    }

    #[test]
    fn insert_and_update_values() {
        let post = Post {
            id: 1,
            title: "Title".into(),
            ..Default::default()
        };
        let mut mapper = Mapper::new(&MySqlSyntax, &SnakeCase);
        mapper.parse(&post, ParseMode::Insert).unwrap();
        let (columns, values) = mapper.get_insert_column_and_values();
        assert_eq!(columns.len(), 6);
        // The zero time is written as null, the column stays.
        assert_eq!(columns[5], "created_at");
        assert_eq!(values[5], Value::Null);
        assert_eq!(values[0], Value::UInt64(Some(1)));
        assert_eq!(mapper.field("score").map(|v| v.kind), Some(FieldKind::Float));

        let mut mapper = Mapper::new(&MySqlSyntax, &SnakeCase);
        mapper.parse(&post, ParseMode::Update).unwrap();
        let (columns, values) = mapper.get_update_column_and_values();
        assert_eq!(columns, ["p.id", "p.title"]);
        assert_eq!(
            values,
            vec![Value::UInt64(Some(1)), Value::Varchar(Some("Title".into()))]
        );
    }

    #[test]
    fn some_zero_is_not_zero() {
        #[derive(strata::Mapped, Default)]
        #[strata(table = "counters")]
        struct Counter {
            pub hits: Option<i32>,
        }
        let counter = Counter { hits: Some(0) };
        let mut mapper = Mapper::new(&MySqlSyntax, &SnakeCase);
        mapper.parse(&counter, ParseMode::Update).unwrap();
        let (columns, values) = mapper.get_update_column_and_values();
        assert_eq!(columns, ["hits"]);
        assert_eq!(values, vec![Value::Int32(Some(0))]);
    }

    #[test]
    fn explicit_table_wins() {
        let user = User::default();
        let mut mapper = Mapper::new(&MySqlSyntax, &SnakeCase);
        mapper.set_table(strata::TableRef::new("people", "pe"));
        mapper.parse(&user, ParseMode::Select).unwrap_err();

        let mut mapper = Mapper::new(&MySqlSyntax, &SnakeCase);
        mapper.set_table(strata::TableRef::new("people", "pe"));
        mapper.parse(&user, ParseMode::Update).unwrap();
        assert_eq!(mapper.table().name, "people");
        assert_eq!(mapper.columns(), ["pe.id", "pe.name", "pe.show", "pe.email"]);
    }

    #[test]
    fn unsupported_members() {
        #[derive(strata::Mapped)]
        #[strata(table = "bags")]
        struct Tags {
            pub id: i64,
            pub tags: Vec<String>,
        }
        #[derive(strata::Mapped)]
        #[strata(table = "bags")]
        struct Lookup {
            pub lookup: HashMap<String, i32>,
        }
        let tags = Tags {
            id: 1,
            tags: Vec::new(),
        };
        let error = Mapper::new(&MySqlSyntax, &SnakeCase)
            .parse(&tags, ParseMode::Insert)
            .unwrap_err();
        assert_eq!(
            kind(&error),
            Some(&StrataError::FieldSliceType {
                field: "tags".into()
            })
        );
        let lookup = Lookup {
            lookup: HashMap::new(),
        };
        let error = Mapper::new(&MySqlSyntax, &SnakeCase)
            .parse(&lookup, ParseMode::Insert)
            .unwrap_err();
        assert_eq!(
            kind(&error),
            Some(&StrataError::UnsupportedFieldType {
                field: "lookup".into(),
                kind: "map",
            })
        );
    }

    #[test]
    fn optional_member_without_default() {
        struct Opaque;
        impl strata::Field for Opaque {
            fn type_kind() -> FieldKind {
                FieldKind::Text
            }
            fn kind(&self) -> FieldKind {
                FieldKind::Text
            }
            fn to_value(&self) -> Value {
                Value::Varchar(Some("opaque".into()))
            }
            fn is_zero(&self) -> bool {
                false
            }
            fn scan_buffer(&self) -> Value {
                Value::Varchar(None)
            }
            fn assign(&mut self, _value: Value) -> strata::Result<()> {
                Ok(())
            }
            fn new_empty() -> Option<Self> {
                None
            }
        }
        #[derive(strata::Mapped)]
        #[strata(table = "things")]
        struct Thing {
            pub opaque: Option<Opaque>,
        }
        let mut thing = Thing { opaque: None };
        let error = Mapper::new(&MySqlSyntax, &SnakeCase)
            .parse_select(&mut thing)
            .unwrap_err();
        assert_eq!(
            kind(&error),
            Some(&StrataError::NullFieldUnassignable {
                field: "opaque".into()
            })
        );
        // Writing doesn't need a target.
        let mut mapper = Mapper::new(&MySqlSyntax, &SnakeCase);
        mapper.parse(&thing, ParseMode::Insert).unwrap();
        assert_eq!(mapper.get_insert_column_and_values().1, vec![Value::Null]);
    }

    #[test]
    fn codec_members() {
        #[derive(Default, Debug, PartialEq)]
        pub struct Labels(Vec<String>);
        impl Codec for Labels {
            fn read_bytes(&mut self, data: &[u8]) {
                self.0 = String::from_utf8_lossy(data)
                    .split(',')
                    .filter(|v| !v.is_empty())
                    .map(String::from)
                    .collect();
            }
            fn write_bytes(&self) -> Vec<u8> {
                self.0.join(",").into_bytes()
            }
        }
        strata::codec_field!(Labels);

        #[derive(Mapped, Default)]
        #[strata(table = "notes")]
        struct Note {
            pub id: i64,
            pub labels: Labels,
            #[strata("update_zero")]
            pub extra: Labels,
        }

        let note = Note {
            id: 1,
            labels: Labels(vec!["a".into(), "b".into()]),
            ..Default::default()
        };
        let mut mapper = Mapper::new(&MySqlSyntax, &SnakeCase);
        mapper.parse(&note, ParseMode::Insert).unwrap();
        assert_eq!(mapper.field("labels").map(|v| v.kind), Some(FieldKind::Codec));
        let (_, values) = mapper.get_insert_column_and_values();
        assert_eq!(
            values,
            [
                Value::Int64(Some(1)),
                Value::from(b"a,b".to_vec()),
                Value::from(Vec::<u8>::new()),
            ]
        );

        let empty = Note {
            id: 2,
            ..Default::default()
        };
        let mut mapper = Mapper::new(&MySqlSyntax, &SnakeCase);
        mapper.parse(&empty, ParseMode::Insert).unwrap();
        assert_eq!(mapper.get_insert_column_and_values().1[1], Value::Null);
        let mut mapper = Mapper::new(&MySqlSyntax, &SnakeCase);
        mapper.parse(&empty, ParseMode::Update).unwrap();
        assert_eq!(mapper.get_update_column_and_values().0, ["id", "extra"]);

        let mut scanned = Note::default();
        let mut mapper = Mapper::new(&MySqlSyntax, &SnakeCase);
        mapper.parse_select(&mut scanned).unwrap();
        {
            let (_, mut addresses) = mapper.get_column_and_address();
            *addresses[1] = Value::Varchar(Some("x,y".into()));
            *addresses[2] = Value::Blob(None);
        }
        mapper.assign_address_value(&mut scanned).unwrap();
        assert_eq!(scanned.labels, Labels(vec!["x".into(), "y".into()]));
        assert_eq!(scanned.extra, Labels::default());
    }

    #[test]
    fn object_without_members() {
        #[derive(strata::Mapped)]
        #[strata(table = "nothing")]
        struct Nothing {
            #[allow(dead_code)]
            hidden: i32,
        }
        let error = Mapper::new(&MySqlSyntax, &SnakeCase)
            .parse(&Nothing { hidden: 0 }, ParseMode::Select)
            .unwrap_err();
        assert_eq!(kind(&error), Some(&StrataError::ObjectNoFields));
    }

    #[test]
    fn ignored_member_keeps_its_value() {
        let mut user = User {
            cached: vec!["keep".into()],
            ..Default::default()
        };
        let mut mapper = Mapper::new(&MySqlSyntax, &SnakeCase);
        mapper.parse_select(&mut user).unwrap();
        assert!(!mapper.columns().iter().any(|v| v == "cached"));
        let (_, addresses) = mapper.get_column_and_address();
        for address in addresses {
            *address = Value::Null;
        }
        mapper.assign_address_value(&mut user).unwrap();
        assert_eq!(user.cached, ["keep"]);
        assert_eq!(user.type_name(), "User");
        assert_eq!(ZERO_TIME, Post::default().created_at);
    }
}
