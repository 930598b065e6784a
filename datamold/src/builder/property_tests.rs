//! Property-based tests for positional matching and value transforms.

#[cfg(test)]
mod tests {
    use crate::builder::{BuilderFactory, BuilderOptions};
    use crate::contract::ContractRegistry;
    use crate::testing::{person_document, person_map, Person};
    use proptest::prelude::*;
    use serde_json::{json, Value};
    use std::sync::Arc;

    crate::contract! {
        struct Triple {
            a: String => "A",
            b: String => "B",
            c: String => "C",
        }
    }

    fn factory(options: BuilderOptions) -> BuilderFactory {
        BuilderFactory::new()
            .with_registry(Arc::new(ContractRegistry::new()))
            .with_options(options)
    }

    fn field_of<'t>(triple: &'t Triple, name: &str) -> &'t str {
        match name {
            "A" => &triple.a,
            "B" => &triple.b,
            _ => &triple.c,
        }
    }

    proptest! {
        #[test]
        fn positional_fallback_follows_declaration_order(
            x in "[a-z]{0,8}",
            y in "[a-z]{0,8}",
            z in "[a-z]{0,8}"
        ) {
            let triple: Triple = factory(BuilderOptions::strict())
                .create((x.as_str(), y.as_str(), z.as_str()))
                .unwrap();
            prop_assert_eq!(&triple.a, &x);
            prop_assert_eq!(&triple.b, &y);
            prop_assert_eq!(&triple.c, &z);
        }

        #[test]
        fn name_table_places_each_element(
            order in Just(vec!["A", "B", "C"]).prop_shuffle(),
            values in proptest::collection::vec("[a-z]{1,6}", 3)
        ) {
            let names: Vec<String> = order.iter().map(ToString::to_string).collect();
            let elements: Vec<Value> = values.iter().map(|v| json!(v)).collect();

            let triple: Triple = factory(BuilderOptions::strict())
                .create_with_element_names(elements, &names)
                .unwrap();

            for (position, name) in order.iter().enumerate() {
                prop_assert_eq!(field_of(&triple, name), values[position].as_str());
            }
        }

        #[test]
        fn transform_is_adapter_independent(
            first in "[A-Za-z]{1,10}",
            last in "[A-Za-z]{1,10}",
            gender in "[A-Za-z]{1,10}",
            suffix in "[!?#]{1,3}"
        ) {
            let tail = suffix.clone();
            let builder = factory(BuilderOptions::new().with_transform(move |_, value| {
                json!(format!("{}{tail}", value.as_str().unwrap_or_default()))
            }));

            let map = person_map(&first, &last, &gender);
            let document = person_document(&first, &last, &gender);

            let from_map: Person = builder.create(&map).unwrap();
            let from_document: Person = builder.create(&document).unwrap();
            let from_tuple: Person = builder
                .create((first.as_str(), last.as_str(), gender.as_str()))
                .unwrap();

            prop_assert_eq!(&from_map, &from_document);
            prop_assert_eq!(&from_map, &from_tuple);
            prop_assert_eq!(from_map.first_name, format!("{first}{suffix}"));
        }
    }
}
