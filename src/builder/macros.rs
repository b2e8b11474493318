//! Macros for naming the states of a fixed layout.

/// Generate a typed enum for the states of a hand-built layout.
///
/// Each variant is paired with the state name used in the layout. The
/// generated type offers `name()`, `from_name()`, an `ALL` list in
/// declaration order and `is_terminal()` for the variants listed under
/// `terminal:`.
///
/// # Example
///
/// ```
/// use tickwise::state_enum;
///
/// state_enum! {
///     pub enum Lamp {
///         Dark => "dark",
///         Lit => "lit",
///         Broken => "broken",
///     }
///     terminal: [Broken]
/// }
///
/// assert_eq!(Lamp::Lit.name(), "lit");
/// assert_eq!(Lamp::from_name("dark"), Some(Lamp::Dark));
/// assert!(Lamp::Broken.is_terminal());
/// assert_eq!(Lamp::ALL.len(), 3);
/// ```
#[macro_export]
macro_rules! state_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident => $label:literal
            ),* $(,)?
        }

        $(terminal: [$($terminal:ident),* $(,)?])?
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, serde::Serialize, serde::Deserialize)]
        $vis enum $name {
            $(
                $(#[$variant_meta])*
                $variant
            ),*
        }

        impl $name {
            /// Every variant, in declaration order.
            pub const ALL: &'static [$name] = &[$(Self::$variant),*];

            pub fn name(self) -> &'static str {
                match self {
                    $(Self::$variant => $label),*
                }
            }

            pub fn from_name(name: &str) -> Option<Self> {
                match name {
                    $($label => Some(Self::$variant),)*
                    _ => None,
                }
            }

            pub fn is_terminal(self) -> bool {
                match self {
                    $($(Self::$terminal => true,)*)?
                    _ => false,
                }
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str(self.name())
            }
        }
    };
}
