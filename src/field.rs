//! The seven soil/climate inputs and their fill rule

use std::fmt;
use std::str::FromStr;

/// One of the seven required numeric inputs.
/// Declaration order is form order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FieldKey
{   Nitrogen
  , Phosphorus
  , Potassium
  , Temperature
  , Humidity
  , Ph
  , Rainfall
}

impl FieldKey
{   /// Every required key, in form order
    pub const ALL: [FieldKey; 7] = [
      FieldKey::Nitrogen
    , FieldKey::Phosphorus
    , FieldKey::Potassium
    , FieldKey::Temperature
    , FieldKey::Humidity
    , FieldKey::Ph
    , FieldKey::Rainfall
    ];

    /// Position in `ALL`
    pub fn index(self) -> usize
    {   self as usize
    }

    /// JSON key used on the wire
    pub fn wire_name(self) -> &'static str
    {   match self
        {   FieldKey::Nitrogen => "N"
          , FieldKey::Phosphorus => "P"
          , FieldKey::Potassium => "K"
          , FieldKey::Temperature => "temperature"
          , FieldKey::Humidity => "humidity"
          , FieldKey::Ph => "ph"
          , FieldKey::Rainfall => "rainfall"
        }
    }

    pub fn label(self) -> &'static str
    {   match self
        {   FieldKey::Nitrogen => "Nitrogen (N)"
          , FieldKey::Phosphorus => "Phosphorus (P)"
          , FieldKey::Potassium => "Potassium (K)"
          , FieldKey::Temperature => "Temperature (°C)"
          , FieldKey::Humidity => "Humidity (%)"
          , FieldKey::Ph => "pH Level"
          , FieldKey::Rainfall => "Rainfall (mm)"
        }
    }

    pub fn placeholder(self) -> &'static str
    {   match self
        {   FieldKey::Nitrogen => "e.g. 90"
          , FieldKey::Phosphorus => "e.g. 42"
          , FieldKey::Potassium => "e.g. 43"
          , FieldKey::Temperature => "e.g. 20"
          , FieldKey::Humidity => "e.g. 82"
          , FieldKey::Ph => "e.g. 6.5"
          , FieldKey::Rainfall => "e.g. 200"
        }
    }
}

impl fmt::Display for FieldKey
{   fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {   f.write_str(self.wire_name())
    }
}

impl FromStr for FieldKey
{   type Err = crate::error::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err>
    {   FieldKey::ALL
          .into_iter()
          .find(|k| k.wire_name() == s)
          .ok_or_else(|| crate::error::Error::UnknownField(s.to_string()))
    }
}

/// A field counts as filled when it has non-whitespace content.
/// Numeric well-formedness is left to the service.
pub fn is_filled(raw_value: &str) -> bool
{   !raw_value.trim().is_empty()
}
