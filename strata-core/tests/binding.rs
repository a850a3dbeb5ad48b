#[cfg(test)]
mod tests {
    use strata_core::{Binding, Bucket, Record, Value};

    #[test]
    fn buckets_in_placeholder_order() {
        let mut binding = Binding::new();
        assert!(binding.is_empty());
        binding.add_binding(Bucket::Where, 3);
        binding.add_binding(Bucket::Join, "joined");
        binding.add_binding(Bucket::Order, 9);
        binding.add_binding(Bucket::Select, true);
        assert_eq!(
            binding.bindings(),
            vec![
                Value::from(true),
                Value::from("joined"),
                Value::from(3),
                Value::from(9),
            ]
        );
        assert_eq!(binding.bucket(Bucket::Join), [Value::from("joined")]);
        assert_eq!(binding.bucket_bindings(Bucket::Where), vec![Value::from(3)]);
    }

    #[test]
    fn named_buckets() {
        let mut binding = Binding::new();
        binding.add_named("where", 1);
        binding.add_named("having", 2);
        binding.add_named("nowhere", 3);
        assert_eq!(binding.bindings(), vec![Value::from(1), Value::from(2)]);
        assert_eq!("union".parse::<Bucket>().unwrap(), Bucket::Union);
        assert!("nowhere".parse::<Bucket>().is_err());
        assert_eq!(Bucket::From.to_string(), "from");
    }

    #[test]
    fn lists_are_flattened() {
        let mut binding = Binding::new();
        binding.add_binding(Bucket::Where, [1, 2]);
        binding.add_binding(
            Bucket::Where,
            Value::List(vec![Value::from(3), Value::List(vec![Value::from(4)])]),
        );
        binding.add_binding(Bucket::Where, Value::Map(Record::new()));
        binding.add_binding(Bucket::Where, Value::Null);
        binding.add_binding(Bucket::Where, Value::Int64(None));
        assert_eq!(
            binding.bindings(),
            vec![Value::from(1), Value::from(2), Value::from(3)]
        );
    }

    #[test]
    fn update_and_delete() {
        let mut binding = Binding::new();
        binding.add_binding(Bucket::Join, "j");
        binding.add_binding(Bucket::Where, "w");
        binding.add_binding(Bucket::Having, "h");
        binding.add_binding(Bucket::Select, "s");
        assert_eq!(
            binding.prepare_update_binding(vec![Value::from("set")]),
            vec![Value::from("set"), Value::from("w"), Value::from("h")]
        );
        assert_eq!(binding.prepare_delete_binding(), vec![Value::from("w")]);
    }

    #[test]
    fn merge_and_clear() {
        let mut sub = Binding::new();
        sub.add_binding(Bucket::Join, 1);
        sub.add_binding(Bucket::Where, 2);
        let mut binding = Binding::new();
        binding.add_binding(Bucket::Where, 0);
        binding.merge_into(Bucket::Where, &sub);
        assert_eq!(
            binding.bucket(Bucket::Where),
            [Value::from(0), Value::from(1), Value::from(2)]
        );
        binding.clear();
        assert!(binding.is_empty());
    }
}
