#[cfg(test)]
mod tests {
    use strata_core::{FromValue, StrataError, Value};
    use time::macros::datetime;

    #[test]
    fn value_null() {
        assert_eq!(Value::Null, Value::Null);
        assert!(Value::Int32(None).is_null());
        assert!(Value::Varchar(None).is_null());
        assert!(!Value::List(Vec::new()).is_null());
        assert_eq!(Value::from(None::<i32>), Value::Null);
    }

    #[test]
    fn value_integers() {
        let val: Value = 127i8.into();
        assert_eq!(val, Value::Int8(Some(127)));
        assert_eq!(i8::from_value(val).unwrap(), 127);
        assert_eq!(i64::from_value(Value::UInt8(Some(5))).unwrap(), 5);
        assert_eq!(u16::from_value(Value::Varchar(Some("65535".into()))).unwrap(), 65535);
        assert_eq!(i32::from_value(Value::Boolean(Some(true))).unwrap(), 1);
        let error = u8::from_value(Value::Int32(Some(300))).unwrap_err();
        assert!(matches!(
            StrataError::of(&error),
            Some(StrataError::ValueConversion { to: "u8", .. })
        ));
        assert!(i32::from_value(Value::Varchar(Some("12a".into()))).is_err());
        assert!(i32::from_value(Value::Varchar(Some(String::new()))).is_err());
    }

    #[test]
    fn value_floats() {
        assert_eq!(f64::from_value(Value::Float32(Some(1.5))).unwrap(), 1.5);
        assert_eq!(f32::from_value(Value::Int64(Some(3))).unwrap(), 3.0);
        assert_eq!(
            f64::from_value(Value::Blob(Some(b"2.25".to_vec().into_boxed_slice()))).unwrap(),
            2.25
        );
        assert!(f64::from_value(Value::Varchar(Some("abc".into()))).is_err());
    }

    #[test]
    fn value_bool() {
        assert_eq!(Value::from(true), Value::Boolean(Some(true)));
        assert!(bool::from_value(Value::Int16(Some(8))).unwrap());
        assert!(!bool::from_value(Value::UInt64(Some(0))).unwrap());
        assert!(bool::from_value(Value::Varchar(Some("true".into()))).unwrap());
        assert!(!bool::from_value(Value::Blob(Some(b"0".to_vec().into_boxed_slice()))).unwrap());
        assert!(bool::from_value(Value::Float32(Some(0.5))).is_err());
    }

    #[test]
    fn value_text() {
        assert_eq!(Value::from("hi"), Value::Varchar(Some("hi".into())));
        assert_eq!(String::from_value(Value::Int64(Some(-4))).unwrap(), "-4");
        assert_eq!(String::from_value(Value::Float64(Some(0.5))).unwrap(), "0.5");
        assert_eq!(String::from_value(Value::Boolean(Some(false))).unwrap(), "0");
        assert_eq!(
            String::from_value(Value::Blob(Some(b"raw".to_vec().into_boxed_slice()))).unwrap(),
            "raw"
        );
        assert!(String::from_value(Value::List(Vec::new())).is_err());
    }

    #[test]
    fn value_bytes() {
        let val = Value::from(vec![1u8, 2, 3]);
        assert_eq!(val, Value::Blob(Some(vec![1, 2, 3].into_boxed_slice())));
        assert_eq!(Vec::<u8>::from_value(val).unwrap(), [1, 2, 3]);
        assert_eq!(
            Vec::<u8>::from_value(Value::Varchar(Some("ab".into()))).unwrap(),
            b"ab"
        );
        assert_eq!(
            Value::Blob(Some(b"ab".to_vec().into_boxed_slice())).into_text_if_blob(),
            Value::Varchar(Some("ab".into()))
        );
        assert_eq!(Value::Blob(None).into_text_if_blob(), Value::Varchar(None));
        assert_eq!(Value::Int8(Some(1)).into_text_if_blob(), Value::Int8(Some(1)));
    }

    #[test]
    fn value_time() {
        let moment = datetime!(2025-06-30 23:59:01);
        assert_eq!(Value::from(moment), Value::Timestamp(Some(moment)));
        assert_eq!(
            time::PrimitiveDateTime::from_value(Value::Varchar(Some("2025-06-30 23:59:01".into())))
                .unwrap(),
            moment
        );
        assert!(
            time::PrimitiveDateTime::from_value(Value::Varchar(Some("yesterday".into()))).is_err()
        );
    }

    #[test]
    fn value_collections() {
        assert_eq!(
            Value::from([1, 2]),
            Value::List(vec![Value::Int32(Some(1)), Value::Int32(Some(2))])
        );
        assert_eq!(
            Value::from(&["a", "b"][..]),
            Value::List(vec![Value::from("a"), Value::from("b")])
        );
        assert!(!Value::from([1]).is_bindable());
        assert!(Value::Null.is_bindable());
        assert_eq!(Value::from([1]).type_name(), "list");
    }

    #[test]
    fn value_display() {
        assert_eq!(Value::Null.to_string(), "NULL");
        assert_eq!(Value::Varchar(None).to_string(), "NULL");
        assert_eq!(Value::from(-3i16).to_string(), "-3");
        assert_eq!(Value::from("text").to_string(), "text");
        assert_eq!(Value::from(vec![0xABu8, 0x01]).to_string(), "0xab01");
        assert_eq!(
            Value::from(datetime!(2024-01-02 03:04:05)).to_string(),
            "2024-01-02 03:04:05"
        );
        assert_eq!(Value::from([1, 2]).to_string(), "(1,2)");
        assert_eq!(
            Value::Map(
                [
                    ("b".to_string(), Value::from(true)),
                    ("a".to_string(), Value::Null),
                ]
                .into()
            )
            .to_string(),
            "{a:NULL,b:true}"
        );
    }
}
