//! Name-based special type inference.
//!
//! Discovery only knows a column's name and physical type. Naming conventions
//! (`*_lat`, `zip_code`, `status`, ...) are a strong hint of the semantic role,
//! so [`infer_special_type`] scans an ordered rule table and returns the
//! special type of the first rule whose pattern matches the whole lower-cased
//! name and whose base-type set admits the column's base type.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{CatalogError, CatalogResult};
use crate::field::types::{BaseType, SpecialType};
use crate::{log_classify_debug, log_classify_error};

/// Base types a rule applies to.
#[derive(Debug, Clone, Copy)]
pub enum AllowedBaseTypes {
    Any,
    Only(&'static [BaseType]),
}

impl AllowedBaseTypes {
    pub fn admits(&self, base_type: BaseType) -> bool {
        match self {
            AllowedBaseTypes::Any => true,
            AllowedBaseTypes::Only(types) => types.contains(&base_type),
        }
    }
}

/// Uncompiled rule as declared in [`RULE_SPECS`].
#[derive(Debug, Clone, Copy)]
pub struct RuleSpec {
    pub pattern: &'static str,
    pub base_types: AllowedBaseTypes,
    pub special_type: SpecialType,
}

/// A rule with its pattern compiled and anchored.
#[derive(Debug, Clone)]
pub struct PatternRule {
    regex: Regex,
    base_types: AllowedBaseTypes,
    special_type: SpecialType,
}

impl PatternRule {
    /// Compiles `spec`, anchoring the pattern so it must match the whole name.
    pub fn compile(spec: &RuleSpec) -> CatalogResult<Self> {
        let anchored = format!("^(?:{})$", spec.pattern);
        let regex = Regex::new(&anchored).map_err(|e| {
            CatalogError::validation(format!(
                "Regex compilation failed for rule '{}': {}",
                spec.pattern, e
            ))
        })?;
        Ok(Self {
            regex,
            base_types: spec.base_types,
            special_type: spec.special_type,
        })
    }

    pub fn matches(&self, lowered_name: &str, base_type: BaseType) -> bool {
        self.base_types.admits(base_type) && self.regex.is_match(lowered_name)
    }

    pub fn special_type(&self) -> SpecialType {
        self.special_type
    }
}

const FLOAT: AllowedBaseTypes = AllowedBaseTypes::Only(&[BaseType::FloatField, BaseType::DecimalField]);
const TEXT: AllowedBaseTypes = AllowedBaseTypes::Only(&[BaseType::CharField, BaseType::TextField]);
const INT_OR_TEXT: AllowedBaseTypes = AllowedBaseTypes::Only(&[
    BaseType::BigIntegerField,
    BaseType::IntegerField,
    BaseType::CharField,
    BaseType::TextField,
]);
const BOOL_OR_INT: AllowedBaseTypes = AllowedBaseTypes::Only(&[
    BaseType::BooleanField,
    BaseType::BigIntegerField,
    BaseType::IntegerField,
]);
const INT_OR_FLOAT: AllowedBaseTypes = AllowedBaseTypes::Only(&[
    BaseType::BigIntegerField,
    BaseType::IntegerField,
    BaseType::FloatField,
    BaseType::DecimalField,
]);

const fn rule(pattern: &'static str, base_types: AllowedBaseTypes, special_type: SpecialType) -> RuleSpec {
    RuleSpec {
        pattern,
        base_types,
        special_type,
    }
}

/// Ordered rule table. Earlier rules win when several match.
pub const RULE_SPECS: &[RuleSpec] = &[
    rule(".*_lat", FLOAT, SpecialType::Latitude),
    rule(".*_lon", FLOAT, SpecialType::Longitude),
    rule(".*_lng", FLOAT, SpecialType::Longitude),
    rule(".*_long", FLOAT, SpecialType::Longitude),
    rule(".*_longitude", FLOAT, SpecialType::Longitude),
    rule(".*_rating", INT_OR_FLOAT, SpecialType::Category),
    rule(".*_type", INT_OR_TEXT, SpecialType::Category),
    rule(".*_url", TEXT, SpecialType::Url),
    rule("_latitude", FLOAT, SpecialType::Latitude),
    rule("active", BOOL_OR_INT, SpecialType::Category),
    rule("city", TEXT, SpecialType::City),
    rule("country", TEXT, SpecialType::Country),
    rule("countrycode", TEXT, SpecialType::Country),
    rule("currency", INT_OR_TEXT, SpecialType::Category),
    rule("first_name", TEXT, SpecialType::Name),
    rule("full_name", TEXT, SpecialType::Name),
    rule("gender", INT_OR_TEXT, SpecialType::Category),
    rule("last_name", TEXT, SpecialType::Name),
    rule("lat", FLOAT, SpecialType::Latitude),
    rule("latitude", FLOAT, SpecialType::Latitude),
    rule("lon", FLOAT, SpecialType::Longitude),
    rule("lng", FLOAT, SpecialType::Longitude),
    rule("long", FLOAT, SpecialType::Longitude),
    rule("longitude", FLOAT, SpecialType::Longitude),
    rule("name", TEXT, SpecialType::Name),
    rule("postalcode", INT_OR_TEXT, SpecialType::ZipCode),
    rule("postal_code", INT_OR_TEXT, SpecialType::ZipCode),
    rule("rating", INT_OR_FLOAT, SpecialType::Category),
    rule("role", INT_OR_TEXT, SpecialType::Category),
    rule("sex", INT_OR_TEXT, SpecialType::Category),
    rule("state", TEXT, SpecialType::State),
    rule("status", INT_OR_TEXT, SpecialType::Category),
    rule("type", INT_OR_TEXT, SpecialType::Category),
    rule("url", TEXT, SpecialType::Url),
    rule("zip_code", INT_OR_TEXT, SpecialType::ZipCode),
    rule("zipcode", INT_OR_TEXT, SpecialType::ZipCode),
    rule(".*_json", TEXT, SpecialType::Json),
    rule(".*_avatar", TEXT, SpecialType::Avatar),
    rule(".*_image", TEXT, SpecialType::Image),
    rule("description", TEXT, SpecialType::Description),
];

/// Compiles `specs` in order. Fails on the first invalid pattern or on a
/// special type outside the taxonomy.
pub fn compile_rules(specs: &[RuleSpec]) -> CatalogResult<Vec<PatternRule>> {
    specs
        .iter()
        .map(|spec| {
            if !spec.special_type.is_member() {
                return Err(CatalogError::validation(format!(
                    "Rule '{}' references unknown special type {}",
                    spec.pattern, spec.special_type
                )));
            }
            PatternRule::compile(spec)
        })
        .collect()
}

static RULES: Lazy<CatalogResult<Vec<PatternRule>>> = Lazy::new(|| compile_rules(RULE_SPECS));

/// Startup self-check of the rule table.
pub fn verify_rule_table() -> CatalogResult<()> {
    match (*RULES).as_ref() {
        Ok(_) => Ok(()),
        Err(e) => Err(rule_table_error(e)),
    }
}

fn rule_table_error(e: &CatalogError) -> CatalogError {
    let detail = match e {
        CatalogError::Validation(msg) => msg.clone(),
        other => other.to_string(),
    };
    CatalogError::validation(format!("Rule table failed to compile: {detail}"))
}

/// First special type in `rules` that matches. `id` short-circuits the table.
pub fn infer_with_rules(rules: &[PatternRule], name: &str, base_type: BaseType) -> Option<SpecialType> {
    let lowered = name.to_lowercase();
    if lowered == "id" {
        return Some(SpecialType::Id);
    }
    rules
        .iter()
        .find(|rule| rule.matches(&lowered, base_type))
        .map(PatternRule::special_type)
}

/// Infers a special type for a column from its name and base type.
///
/// Returns `None` when no rule matches, and also when the rule table failed
/// to compile (the failure is reported by [`verify_rule_table`]).
pub fn infer_special_type(name: &str, base_type: BaseType) -> Option<SpecialType> {
    let rules = match (*RULES).as_ref() {
        Ok(rules) => rules,
        Err(e) => {
            log_classify_error!("Rule table unavailable: {}", e);
            return None;
        }
    };
    let inferred = infer_with_rules(rules, name, base_type);
    log_classify_debug!("Inferred {:?} for '{}' ({})", inferred, name, base_type);
    inferred
}

/// Variant of [`infer_special_type`] for untyped input. An unrecognized base
/// type means no inference is possible.
pub fn infer_special_type_raw(name: &str, base_type: &str) -> Option<SpecialType> {
    base_type
        .parse::<BaseType>()
        .ok()
        .and_then(|base_type| infer_special_type(name, base_type))
}
