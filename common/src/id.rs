//! Macros for defining identifier newtypes.

/// Macro for defining a numeric identifier newtype.
///
/// Identifiers are allocated by the storage layer, so the generated type
/// has no minting constructor of its own. The invoking crate must enable
/// the `serde` feature of this crate and depend on `serde` itself.
///
/// # Example
///
/// ```rust,ignore
/// use common::define_id;
///
/// define_id! {
///     #[doc = "ID of a widget."]
///     Id
/// }
/// ```
#[macro_export]
macro_rules! define_id {
    (
        #[doc = $doc:literal]
        $name:ident
    ) => {
        #[doc = $doc]
        #[derive(
            Clone,
            Copy,
            Debug,
            Default,
            Eq,
            Hash,
            Ord,
            PartialEq,
            PartialOrd,
            $crate::private::derive_more::Display,
            $crate::private::derive_more::From,
            $crate::private::derive_more::FromStr,
            $crate::private::derive_more::Into,
            $crate::private::serde::Deserialize,
            $crate::private::serde::Serialize,
        )]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Returns the raw numeric value of this identifier.
            #[must_use]
            pub const fn get(self) -> i64 {
                self.0
            }
        }
    };
}
