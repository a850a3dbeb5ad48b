#[cfg(test)]
mod tests {
    use strata_core::{NamingStyle, PascalCase, SnakeCase, StrataError, Tag};

    #[test]
    fn empty_tag() {
        assert_eq!(Tag::parse("").unwrap(), Tag::default());
        assert_eq!(Tag::parse(" ;; ").unwrap(), Tag::default());
        let tag = Tag::default();
        assert!(tag.use_alias);
        assert!(!tag.update_zero);
    }

    #[test]
    fn ignore() {
        assert!(Tag::parse("-").unwrap().ignore);
        assert!(Tag::parse("ignore").unwrap().ignore);
        assert!(Tag::parse("col:x;-").unwrap().ignore);
    }

    #[test]
    fn every_attribute() {
        let tag = Tag::parse("col:user_name; use_alias:false ;update_zero").unwrap();
        assert_eq!(tag.column.as_deref(), Some("user_name"));
        assert!(!tag.use_alias);
        assert!(tag.update_zero);
        assert!(!tag.extend);
    }

    #[test]
    fn extend() {
        let tag = Tag::parse("extend").unwrap();
        assert!(tag.extend);
        assert_eq!(tag.extend_table, None);

        let tag = Tag::parse("extend:customers").unwrap();
        assert_eq!(tag.extend_table.as_deref(), Some("customers"));
        assert_eq!(tag.extend_alias, None);

        let tag = Tag::parse("extend:customers as c").unwrap();
        assert_eq!(tag.extend_table.as_deref(), Some("customers"));
        assert_eq!(tag.extend_alias.as_deref(), Some("c"));
    }

    #[test]
    fn invalid_tags() {
        for raw in ["col", "col:", "use_alias:maybe", "update_zero:2", "primary"] {
            let error = Tag::parse(raw).unwrap_err();
            assert!(
                matches!(
                    StrataError::of(&error),
                    Some(StrataError::InvalidTag { tag, .. }) if tag == raw
                ),
                "{raw}: {error:#}"
            );
        }
    }

    #[test]
    fn column_name() {
        let tag = Tag::default();
        assert_eq!(tag.column_name("CreatedAt", &SnakeCase), "created_at");
        assert_eq!(tag.column_name("created_at", &PascalCase), "CreatedAt");
        let tag = Tag::parse("col:Custom").unwrap();
        assert_eq!(tag.column_name("other", &SnakeCase), "Custom");
    }

    #[test]
    fn naming() {
        assert_eq!(SnakeCase.table("UserProfile"), "user_profile");
        assert_eq!(PascalCase.table("user_profile"), "UserProfile");
        assert_eq!(
            "camel".parse::<strata_core::Naming>().unwrap(),
            strata_core::Naming::Pascal
        );
        assert_eq!(
            strata_core::Naming::Snake.style().column("SomeField"),
            "some_field"
        );
        assert!("kebab".parse::<strata_core::Naming>().is_err());
    }
}
