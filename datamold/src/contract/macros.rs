//! Declarative contract structs.

/// Declares a struct and its [`Contract`](crate::contract::Contract) impl in one go.
///
/// Each field names the contract field it binds to. The struct derives
/// `Debug`, `Clone`, `Default` and `PartialEq`.
///
/// ```rust,ignore
/// datamold::contract! {
///     pub struct Person {
///         pub first_name: String => "FirstName",
///         pub last_name: String => "LastName",
///         pub age: Option<u32> => "Age",
///     }
/// }
/// ```
#[macro_export]
macro_rules! contract {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident {
            $(
                $(#[$field_meta:meta])*
                $field_vis:vis $field:ident : $ty:ty => $source:literal
            ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default, PartialEq)]
        $vis struct $name {
            $(
                $(#[$field_meta])*
                $field_vis $field: $ty,
            )+
        }

        impl $crate::contract::Contract for $name {
            fn define(
                definition: $crate::contract::ContractDefinition<Self>,
            ) -> $crate::contract::ContractDefinition<Self> {
                definition
                    $(
                        .field($source, |target: &mut Self, value: $ty| target.$field = value)
                    )+
            }

            fn contract_name() -> &'static str {
                stringify!($name)
            }
        }
    };
}
