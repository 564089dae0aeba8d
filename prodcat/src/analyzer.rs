//! Field discovery over stored product details.
//!
//! Scans the `details` objects of a product collection and reports, per key,
//! the inferred type, a few example values and how often the key shows up.
//! This is a read-only pass used by the admin "known fields" view.

use std::collections::{BTreeMap, HashMap};

use log::debug;
use serde::{Serialize, Serializer};

use crate::inference::infer_type;
use crate::types::{Product, TypeTag};
use crate::value::DetailValue;

/// Distinct example values kept per field. Later distinct values are dropped.
pub const MAX_EXAMPLES: usize = 5;

/// Examples shown by [`InferredField::display_examples`].
pub const DISPLAY_EXAMPLES: usize = 3;

/// First-come bounded set of distinct example values.
///
/// Equality is structural, so two equal objects count once.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExampleSet {
    values: Vec<DetailValue>,
}

impl ExampleSet {
    /// Adds `value` unless it is already present or the set is full.
    /// Returns whether the value was stored.
    pub fn insert(&mut self, value: &DetailValue) -> bool {
        if self.is_full() || self.values.contains(value) {
            return false;
        }
        self.values.push(value.clone());
        true
    }

    pub fn is_full(&self) -> bool {
        self.values.len() >= MAX_EXAMPLES
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn as_slice(&self) -> &[DetailValue] {
        &self.values
    }
}

impl Serialize for ExampleSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.values.serialize(serializer)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "utoipa", derive(utoipa::ToSchema))]
pub struct Frequency {
    pub count: usize,
    pub percentage: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "utoipa", derive(utoipa::ToSchema))]
pub struct InferredField {
    pub key: String,
    #[serde(rename = "type")]
    #[cfg_attr(feature = "utoipa", schema(value_type = String))]
    pub type_tag: TypeTag,
    #[cfg_attr(feature = "utoipa", schema(value_type = Vec<Object>))]
    pub examples: ExampleSet,
    pub frequency: Frequency,
    pub description: String,
}

impl InferredField {
    pub fn display_examples(&self) -> &[DetailValue] {
        let examples = self.examples.as_slice();
        &examples[..examples.len().min(DISPLAY_EXAMPLES)]
    }
}

/// Field-name to description dictionary used to label discovered fields.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDescriptions {
    entries: BTreeMap<String, String>,
}

const BUILTIN_DESCRIPTIONS: &[(&str, &str)] = &[
    ("interestRate", "Annual interest rate offered on the product"),
    ("apr", "Annual percentage rate including fees"),
    ("loanTerm", "Repayment period of the loan"),
    ("minAmount", "Smallest amount that can be borrowed or deposited"),
    ("maxAmount", "Largest amount that can be borrowed or deposited"),
    ("processingFee", "One-time fee charged when the product is issued"),
    ("annualFee", "Yearly fee charged to keep the product active"),
    ("eligibility", "Requirements an applicant must meet"),
    ("features", "Key features and benefits"),
    ("currency", "Currency the product is denominated in"),
    ("minimumBalance", "Balance that must be kept to avoid charges"),
    ("creditScore", "Minimum credit score required"),
];

impl Default for FieldDescriptions {
    fn default() -> Self {
        Self {
            entries: BUILTIN_DESCRIPTIONS
                .iter()
                .map(|(key, description)| (key.to_string(), description.to_string()))
                .collect(),
        }
    }
}

impl FieldDescriptions {
    pub fn empty() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    pub fn insert(&mut self, key: impl Into<String>, description: impl Into<String>) {
        self.entries.insert(key.into(), description.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Dictionary entry for `key`, or the key split into title-cased words.
    pub fn describe(&self, key: &str) -> String {
        self.get(key).map(str::to_string).unwrap_or_else(|| humanize_key(key))
    }
}

/// `interestRate` becomes `Interest Rate`, `max_amount` becomes `Max Amount`.
pub fn humanize_key(key: &str) -> String {
    let mut words: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut prev: Option<char> = None;
    for c in key.chars() {
        if c == '_' || c == '-' || c.is_whitespace() {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
        } else {
            let boundary = c.is_uppercase() && prev.is_some_and(|p| p.is_lowercase() || p.is_ascii_digit());
            if boundary && !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            current.push(c);
        }
        prev = Some(c);
    }
    if !current.is_empty() {
        words.push(current);
    }

    words
        .iter()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

#[derive(Debug, Clone)]
pub struct FieldAnalyzer {
    descriptions: FieldDescriptions,
}

impl Default for FieldAnalyzer {
    fn default() -> Self {
        Self::new(FieldDescriptions::default())
    }
}

impl FieldAnalyzer {
    pub fn new(descriptions: FieldDescriptions) -> Self {
        Self { descriptions }
    }

    /// Analyzes every product's details, most frequent fields first.
    ///
    /// `frequency.count` is the number of captured examples for the key, so it
    /// never exceeds [`MAX_EXAMPLES`] even when the key occurs in more
    /// products. Percentages are relative to `products.len()` and rounded.
    /// Fields with equal percentages keep first-seen order.
    pub fn analyze(&self, products: &[Product]) -> Vec<InferredField> {
        self.analyze_iter(products.iter(), products.len())
    }

    /// Same as [`FieldAnalyzer::analyze`], restricted to one category.
    pub fn analyze_category(&self, products: &[Product], category_id: &str) -> Vec<InferredField> {
        let scoped: Vec<&Product> = products
            .iter()
            .filter(|product| product.category_id.as_deref() == Some(category_id))
            .collect();
        self.analyze_iter(scoped.iter().copied(), scoped.len())
    }

    fn analyze_iter<'a>(&self, products: impl Iterator<Item = &'a Product>, total: usize) -> Vec<InferredField> {
        let mut order: Vec<(String, TypeTag, ExampleSet)> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();

        for product in products {
            let Some(DetailValue::Object(details)) = &product.details else {
                debug!("product '{}' has no details object; skipped", product.id);
                continue;
            };
            for (key, value) in details {
                let observed = infer_type(value);
                let slot = *index.entry(key.clone()).or_insert_with(|| {
                    order.push((key.clone(), observed.clone(), ExampleSet::default()));
                    order.len() - 1
                });
                let (_, type_tag, examples) = &mut order[slot];
                if *type_tag != TypeTag::Mixed && *type_tag != observed {
                    debug!("field '{key}' seen as {type_tag} and {observed}; marking mixed");
                    *type_tag = TypeTag::Mixed;
                }
                if !examples.insert(value) && examples.is_full() {
                    debug!("field '{key}' already holds {MAX_EXAMPLES} examples; value dropped");
                }
            }
        }

        let mut fields: Vec<InferredField> = order
            .into_iter()
            .map(|(key, type_tag, examples)| {
                let count = examples.len();
                InferredField {
                    description: self.descriptions.describe(&key),
                    key,
                    type_tag,
                    examples,
                    frequency: Frequency {
                        count,
                        percentage: percentage(count, total),
                    },
                }
            })
            .collect();
        fields.sort_by(|a, b| b.frequency.percentage.cmp(&a.frequency.percentage));
        fields
    }
}

fn percentage(count: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    (count as f64 / total as f64 * 100.0).round() as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn product(details: serde_json::Value) -> Product {
        Product::with_details("p", details)
    }

    #[test]
    fn example_set_is_first_come_and_bounded() {
        let mut set = ExampleSet::default();
        for n in 0..7 {
            set.insert(&DetailValue::Number(n as f64));
        }
        assert!(!set.insert(&DetailValue::Number(0.0)));
        assert_eq!(set.len(), MAX_EXAMPLES);
        assert_eq!(set.as_slice()[4], DetailValue::Number(4.0));
    }

    #[test]
    fn example_set_dedupes_structurally() {
        let mut set = ExampleSet::default();
        assert!(set.insert(&DetailValue::from(json!({"a": [1, 2]}))));
        assert!(!set.insert(&DetailValue::from(json!({"a": [1, 2]}))));
        assert!(set.insert(&DetailValue::from(json!({"a": [2, 1]}))));
    }

    #[test]
    fn humanizes_keys() {
        assert_eq!(humanize_key("interestRate"), "Interest Rate");
        assert_eq!(humanize_key("minLoanAmount"), "Min Loan Amount");
        assert_eq!(humanize_key("max_amount"), "Max Amount");
        assert_eq!(humanize_key("APR"), "APR");
        assert_eq!(humanize_key("tier2Rate"), "Tier2 Rate");
    }

    #[test]
    fn type_becomes_mixed_and_stays_mixed() {
        let products = vec![
            product(json!({"rate": 5})),
            product(json!({"rate": "high"})),
            product(json!({"rate": 7})),
        ];
        let fields = FieldAnalyzer::default().analyze(&products);
        assert_eq!(fields[0].type_tag, TypeTag::Mixed);
    }

    #[test]
    fn skips_products_without_object_details() {
        let mut missing = product(json!({}));
        missing.details = None;
        let products = vec![missing, product(json!(["not", "an", "object"])), product(json!({"fee": 10}))];
        let fields = FieldAnalyzer::default().analyze(&products);
        assert_eq!(fields.len(), 1);
        assert_eq!(fields[0].key, "fee");
        assert_eq!(fields[0].frequency.percentage, 33);
    }

    #[test]
    fn descriptions_come_from_dictionary_then_fallback() {
        let mut descriptions = FieldDescriptions::empty();
        descriptions.insert("fee", "Monthly fee");
        let analyzer = FieldAnalyzer::new(descriptions);
        let fields = analyzer.analyze(&[product(json!({"fee": 1, "interestRate": 2.5}))]);
        let by_key: HashMap<&str, &InferredField> = fields.iter().map(|f| (f.key.as_str(), f)).collect();
        assert_eq!(by_key["fee"].description, "Monthly fee");
        assert_eq!(by_key["interestRate"].description, "Interest Rate");
    }

    #[test]
    fn serializes_type_as_tag_string() {
        let fields = FieldAnalyzer::default().analyze(&[product(json!({"tags": ["a", "b"]}))]);
        let json = serde_json::to_value(&fields[0]).unwrap();
        assert_eq!(json["type"], "array<string>");
        assert_eq!(json["examples"], json!([["a", "b"]]));
        assert_eq!(json["frequency"], json!({"count": 1, "percentage": 100}));
    }

    #[test]
    fn category_scope_filters_products() {
        let mut loan = product(json!({"term": 12}));
        loan.category_id = Some("loans".into());
        let mut card = product(json!({"annualFee": 99}));
        card.category_id = Some("cards".into());
        let fields = FieldAnalyzer::default().analyze_category(&[loan, card], "cards");
        assert_eq!(fields.len(), 1);
        assert_eq!(fields[0].key, "annualFee");
        assert_eq!(fields[0].frequency.percentage, 100);
    }
}
