#![allow(missing_docs)]

//! This module defines the physical and monetary quantities used when aggregating road length and
//! maintenance cost, along with the conversions between them.

/// Length of a survey segment
pub const SEGMENT_LENGTH: Metres = Metres(100.0);

/// Carriageway width assumed when converting length into surface area
pub const STANDARD_ROAD_WIDTH: Metres = Metres(7.5);

/// Number of metres in a kilometre
const METRES_PER_KILOMETRE: f64 = 1000.0;

macro_rules! unit_struct {
    ($name:ident) => {
        /// Represents a type of quantity.
        #[derive(
            Debug,
            Clone,
            Copy,
            PartialEq,
            PartialOrd,
            Default,
            derive_more::Add,
            derive_more::Sub,
            derive_more::AddAssign,
            serde::Serialize,
            serde::Deserialize,
        )]
        pub struct $name(pub f64);

        impl $name {
            /// Creates a new instance of the unit type from a f64 value.
            pub fn from(val: f64) -> Self {
                Self(val)
            }

            /// Returns the value of the unit type as a f64.
            pub fn value(self) -> f64 {
                self.0
            }
        }

        impl std::ops::Mul<f64> for $name {
            type Output = $name;
            fn mul(self, rhs: f64) -> $name {
                $name::from(self.0 * rhs)
            }
        }

        impl std::ops::Div<$name> for $name {
            type Output = f64;
            fn div(self, rhs: $name) -> f64 {
                self.0 / rhs.0
            }
        }

        impl std::iter::Sum for $name {
            fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
                $name::from(iter.map(|x| x.0).sum())
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

macro_rules! impl_mul {
    ($Lhs:ty, $Rhs:ty, $Out:ty) => {
        impl std::ops::Mul<$Rhs> for $Lhs {
            type Output = $Out;
            fn mul(self, rhs: $Rhs) -> $Out {
                <$Out>::from(self.0 * rhs.0)
            }
        }
    };
    (commutative $Lhs:ty, $Rhs:ty, $Out:ty) => {
        impl_mul!($Lhs, $Rhs, $Out);
        impl_mul!($Rhs, $Lhs, $Out);
    };
}

// Base quantities
unit_struct!(Metres);
unit_struct!(Kilometres);
unit_struct!(Money);

// Derived quantities
unit_struct!(SquareMetres);
unit_struct!(MoneyPerSquareMetre);

// Multiplication rules
impl_mul!(Metres, Metres, SquareMetres);
impl_mul!(commutative SquareMetres, MoneyPerSquareMetre, Money);

impl Metres {
    /// Convert to kilometres
    pub fn to_kilometres(self) -> Kilometres {
        Kilometres(self.0 / METRES_PER_KILOMETRE)
    }
}

impl Kilometres {
    /// Convert to metres
    pub fn to_metres(self) -> Metres {
        Metres(self.0 * METRES_PER_KILOMETRE)
    }
}
