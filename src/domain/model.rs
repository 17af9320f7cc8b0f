//! Uom domain model.
//!
//! # Invariants
//! - A `Uom` is only born through [`Uom::create`], which validates the payload,
//!   attaches a freshly generated id and validates the composed entity again.
//! - The id of a `Uom` never changes; updates replace the payload under it.
//! - `snap_amount` keeps insertion order and is never sorted or deduplicated.

use crate::domain::decimal::PreciseDecimal;
use crate::domain::ports::IdGenerator;
use crate::utils::error::{Result, UomError};
use crate::utils::validation::{
    require_non_empty_list, require_non_empty_string, require_present, require_true, Validate,
    ValidationErrors,
};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// What kind of quantity a unit measures.
///
/// Values outside the known set decode into `Unrecognized` so validation can
/// report them against the field instead of failing the whole payload decode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MeasureType {
    Volume,
    Weight,
    Item,
    Package,
    Unrecognized(String),
}

impl MeasureType {
    pub const KNOWN: [&'static str; 4] = ["volume", "weight", "item", "package"];

    pub fn as_str(&self) -> &str {
        match self {
            Self::Volume => "volume",
            Self::Weight => "weight",
            Self::Item => "item",
            Self::Package => "package",
            Self::Unrecognized(raw) => raw,
        }
    }

    pub fn parse(raw: &str) -> Self {
        match raw {
            "volume" => Self::Volume,
            "weight" => Self::Weight,
            "item" => Self::Item,
            "package" => Self::Package,
            other => Self::Unrecognized(other.to_string()),
        }
    }

    pub fn is_recognized(&self) -> bool {
        !matches!(self, Self::Unrecognized(_))
    }
}

/// Which printed name family is used by default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrintedNameType {
    Short,
    Full,
    Unrecognized(String),
}

impl PrintedNameType {
    pub const KNOWN: [&'static str; 2] = ["short", "full"];

    pub fn as_str(&self) -> &str {
        match self {
            Self::Short => "short",
            Self::Full => "full",
            Self::Unrecognized(raw) => raw,
        }
    }

    pub fn parse(raw: &str) -> Self {
        match raw {
            "short" => Self::Short,
            "full" => Self::Full,
            other => Self::Unrecognized(other.to_string()),
        }
    }

    pub fn is_recognized(&self) -> bool {
        !matches!(self, Self::Unrecognized(_))
    }
}

macro_rules! string_enum_serde {
    ($ty:ty) => {
        impl Serialize for $ty {
            fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> Deserialize<'de> for $ty {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
                let raw = String::deserialize(deserializer)?;
                Ok(Self::parse(&raw))
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

string_enum_serde!(MeasureType);
string_enum_serde!(PrintedNameType);

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AdditionalInfo {
    #[serde(default)]
    pub systems: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name_group: Option<String>,
}

/// The mutable payload a client submits.
///
/// Every field decodes leniently (missing values fall back to empty/`None`)
/// so that required-field violations surface from [`BaseUom::validate_with`]
/// with the offending field named.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BaseUom {
    #[serde(default)]
    pub label: String,

    #[serde(default)]
    pub enabled: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub measure_type: Option<MeasureType>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_min: Option<PreciseDecimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_max: Option<PreciseDecimal>,

    #[serde(default)]
    pub snap_amount: Vec<PreciseDecimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snap_select: Option<PreciseDecimal>,

    #[serde(default)]
    pub match_names_recipe: Vec<String>,
    #[serde(default)]
    pub match_names_food_label: Vec<String>,

    #[serde(
        rename = "default_name_type",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub printed_name_default_type: Option<PrintedNameType>,
    #[serde(
        rename = "short_name_singular",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub printed_name_short_singular: Option<String>,
    #[serde(
        rename = "short_name_plural",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub printed_name_short_plural: Option<String>,
    #[serde(
        rename = "full_name_singular",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub printed_name_full_singular: Option<String>,
    #[serde(
        rename = "full_name_plural",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub printed_name_full_plural: Option<String>,

    #[serde(rename = "info", default, skip_serializing_if = "Option::is_none")]
    pub additional_info: Option<AdditionalInfo>,
}

/// Rule set applied by [`BaseUom::validate_with`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UomRules {
    /// Reject payloads whose `enabled` flag is false. This mirrors the
    /// historical "required" rule on the flag and makes disabled records
    /// impossible to store while it is on.
    pub require_enabled: bool,
}

impl Default for UomRules {
    fn default() -> Self {
        Self {
            require_enabled: true,
        }
    }
}

impl BaseUom {
    /// Checks every field rule and reports all violations at once.
    pub fn validate_with(&self, rules: &UomRules) -> std::result::Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        require_non_empty_string(&mut errors, "label", &self.label);

        if rules.require_enabled {
            require_true(&mut errors, "enabled", self.enabled);
        }

        if require_present(&mut errors, "measure_type", &self.measure_type) {
            if let Some(MeasureType::Unrecognized(raw)) = &self.measure_type {
                errors.push(
                    "measure_type",
                    format!(
                        "has unrecognized value {:?}; expected one of {}",
                        raw,
                        MeasureType::KNOWN.join(", ")
                    ),
                );
            }
        }

        require_non_empty_list(&mut errors, "snap_amount", &self.snap_amount);

        if require_present(
            &mut errors,
            "default_name_type",
            &self.printed_name_default_type,
        ) {
            if let Some(PrintedNameType::Unrecognized(raw)) = &self.printed_name_default_type {
                errors.push(
                    "default_name_type",
                    format!(
                        "has unrecognized value {:?}; expected one of {}",
                        raw,
                        PrintedNameType::KNOWN.join(", ")
                    ),
                );
            }
        }

        errors.into_result()
    }
}

impl Validate for BaseUom {
    fn validate(&self) -> Result<()> {
        self.validate_with(&UomRules::default())?;
        Ok(())
    }
}

/// A stored Unit of Measure: the payload plus its immutable id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Uom {
    pub id: String,
    #[serde(flatten)]
    pub base: BaseUom,
}

impl Uom {
    /// Validates `base`, attaches a newly generated id and validates the
    /// composed entity again.
    pub fn create(base: BaseUom, rules: &UomRules, ids: &dyn IdGenerator) -> Result<Self> {
        base.validate_with(rules)?;
        let id = ids.generate()?;
        let uom = Self { id, base };
        uom.validate_with(rules)?;
        Ok(uom)
    }

    /// Composes a record for an id that already exists in the store.
    pub fn from_parts(id: impl Into<String>, base: BaseUom) -> Self {
        Self {
            id: id.into(),
            base,
        }
    }

    pub fn validate_with(&self, rules: &UomRules) -> std::result::Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        require_non_empty_string(&mut errors, "id", &self.id);
        if let Err(base_errors) = self.base.validate_with(rules) {
            errors.extend(base_errors);
        }
        errors.into_result()
    }
}

impl Validate for Uom {
    fn validate(&self) -> Result<()> {
        self.validate_with(&UomRules::default())?;
        Ok(())
    }
}

/// Builds a `BaseUom` programmatically from the required fields plus any
/// recognized options, validating before handing it out.
///
/// Recognized options: group bounds, snap select, recipe and food-label match
/// names, printed names, additional info, enabled flag (defaults to `true`).
#[derive(Debug, Clone)]
pub struct UomBuilder {
    base: BaseUom,
}

impl UomBuilder {
    pub fn new(
        label: impl Into<String>,
        measure_type: MeasureType,
        snap_amount: Vec<PreciseDecimal>,
        default_name_type: PrintedNameType,
    ) -> Self {
        Self {
            base: BaseUom {
                label: label.into(),
                enabled: true,
                measure_type: Some(measure_type),
                snap_amount,
                printed_name_default_type: Some(default_name_type),
                ..BaseUom::default()
            },
        }
    }

    pub fn group(
        mut self,
        group: impl Into<String>,
        group_min: Option<PreciseDecimal>,
        group_max: Option<PreciseDecimal>,
    ) -> Self {
        self.base.group = Some(group.into());
        self.base.group_min = group_min;
        self.base.group_max = group_max;
        self
    }

    pub fn snap_select(mut self, snap_select: PreciseDecimal) -> Self {
        self.base.snap_select = Some(snap_select);
        self
    }

    pub fn match_names_recipe<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.base.match_names_recipe = names.into_iter().map(Into::into).collect();
        self
    }

    pub fn match_names_food_label<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.base.match_names_food_label = names.into_iter().map(Into::into).collect();
        self
    }

    pub fn printed_names(
        mut self,
        short_singular: Option<String>,
        short_plural: Option<String>,
        full_singular: Option<String>,
        full_plural: Option<String>,
    ) -> Self {
        self.base.printed_name_short_singular = short_singular;
        self.base.printed_name_short_plural = short_plural;
        self.base.printed_name_full_singular = full_singular;
        self.base.printed_name_full_plural = full_plural;
        self
    }

    pub fn additional_info(mut self, info: AdditionalInfo) -> Self {
        self.base.additional_info = Some(info);
        self
    }

    pub fn enabled(mut self, enabled: bool) -> Self {
        self.base.enabled = enabled;
        self
    }

    pub fn build(self) -> Result<BaseUom> {
        self.build_with(&UomRules::default())
    }

    pub fn build_with(self, rules: &UomRules) -> Result<BaseUom> {
        self.base.validate_with(rules).map_err(UomError::from)?;
        Ok(self.base)
    }
}

fn write_opt_str(f: &mut fmt::Formatter<'_>, value: &Option<String>) -> fmt::Result {
    match value {
        Some(v) => write!(f, "{:?}", v),
        None => f.write_str("<none>"),
    }
}

fn write_opt<T: fmt::Display>(f: &mut fmt::Formatter<'_>, value: &Option<T>) -> fmt::Result {
    match value {
        Some(v) => write!(f, "{}", v),
        None => f.write_str("<none>"),
    }
}

fn write_list<T: fmt::Debug>(f: &mut fmt::Formatter<'_>, values: &[T]) -> fmt::Result {
    f.write_str("[")?;
    for (i, v) in values.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{:?}", v)?;
    }
    f.write_str("]")
}

impl fmt::Display for AdditionalInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AdditionalInfo { systems=")?;
        write_list(f, &self.systems)?;
        f.write_str(", name_group=")?;
        write_opt_str(f, &self.name_group)?;
        f.write_str(" }")
    }
}

impl fmt::Display for BaseUom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "label={:?}, enabled={}, measure_type=", self.label, self.enabled)?;
        write_opt(f, &self.measure_type)?;
        f.write_str(", group=")?;
        write_opt_str(f, &self.group)?;
        f.write_str(", group_min=")?;
        write_opt(f, &self.group_min)?;
        f.write_str(", group_max=")?;
        write_opt(f, &self.group_max)?;

        let snaps: Vec<String> = self.snap_amount.iter().map(ToString::to_string).collect();
        write!(f, ", snap_amount=[{}]", snaps.join(", "))?;
        f.write_str(", snap_select=")?;
        write_opt(f, &self.snap_select)?;

        f.write_str(", match_names_recipe=")?;
        write_list(f, &self.match_names_recipe)?;
        f.write_str(", match_names_food_label=")?;
        write_list(f, &self.match_names_food_label)?;

        f.write_str(", default_name_type=")?;
        write_opt(f, &self.printed_name_default_type)?;
        f.write_str(", short_name_singular=")?;
        write_opt_str(f, &self.printed_name_short_singular)?;
        f.write_str(", short_name_plural=")?;
        write_opt_str(f, &self.printed_name_short_plural)?;
        f.write_str(", full_name_singular=")?;
        write_opt_str(f, &self.printed_name_full_singular)?;
        f.write_str(", full_name_plural=")?;
        write_opt_str(f, &self.printed_name_full_plural)?;
        f.write_str(", info=")?;
        write_opt(f, &self.additional_info)
    }
}

impl fmt::Display for Uom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Uom {{ id={:?}, {} }}", self.id, self.base)
    }
}
