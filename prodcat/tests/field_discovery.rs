use prodcat::analyzer::{DISPLAY_EXAMPLES, MAX_EXAMPLES};
use prodcat::{DetailValue, FieldAnalyzer, FieldDescriptions, Product, TypeTag, infer_type};
use serde_json::{Value, json};

fn products(details: Vec<Value>) -> Vec<Product> {
    details
        .into_iter()
        .enumerate()
        .map(|(i, details)| Product::with_details(format!("p{i}"), details))
        .collect()
}

#[test]
fn example_cap_bounds_frequency() {
    // 10 products, key present in 7, six distinct values among them
    let mut details = Vec::new();
    for rate in [1, 2, 3, 4, 5, 6, 6] {
        details.push(json!({"interestRate": rate}));
    }
    for _ in 0..3 {
        details.push(json!({"currency": "USD"}));
    }

    let fields = FieldAnalyzer::default().analyze(&products(details));
    let rate = fields.iter().find(|field| field.key == "interestRate").unwrap();

    assert_eq!(rate.examples.len(), MAX_EXAMPLES);
    assert_eq!(rate.frequency.count, 5);
    assert_eq!(rate.frequency.percentage, 50);
    assert_eq!(rate.display_examples().len(), DISPLAY_EXAMPLES);
    assert_eq!(rate.type_tag, TypeTag::Integer);
    assert_eq!(rate.description, "Annual interest rate offered on the product");
}

#[test]
fn sorted_by_percentage_descending() {
    let mut details = Vec::new();
    for i in 0..10 {
        let mut object = serde_json::Map::new();
        if i < 2 {
            object.insert("rare".into(), json!(format!("r{i}")));
        }
        if i < 5 {
            object.insert("half".into(), json!(format!("h{i}")));
        }
        if i < 8 {
            object.insert("common".into(), json!(format!("c{}", i % 4)));
        }
        details.push(Value::Object(object));
    }

    let fields = FieldAnalyzer::default().analyze(&products(details));
    let order: Vec<(&str, u32)> = fields
        .iter()
        .map(|field| (field.key.as_str(), field.frequency.percentage))
        .collect();
    assert_eq!(order, [("half", 50), ("common", 40), ("rare", 20)]);
}

#[test]
fn products_without_details_still_count_towards_total() {
    let mut all = products(vec![json!({"apr": 19.9}), json!({"apr": 21.5})]);
    all.push(Product {
        details: None,
        ..Product::with_details("empty", json!({}))
    });
    all.push(Product::with_details("scalar", json!("not an object")));

    let fields = FieldAnalyzer::default().analyze(&all);
    assert_eq!(fields.len(), 1);
    assert_eq!(fields[0].frequency.percentage, 50);
    assert_eq!(fields[0].type_tag, TypeTag::Decimal);
}

#[test]
fn category_scoped_analysis() {
    let mut all = products(vec![
        json!({"loanTerm": 36}),
        json!({"loanTerm": 60}),
        json!({"annualFee": 95}),
    ]);
    all[0].category_id = Some("sub-car".into());
    all[1].category_id = Some("sub-car".into());
    all[2].category_id = Some("sub-card".into());

    let fields = FieldAnalyzer::default().analyze_category(&all, "sub-car");
    assert_eq!(fields.len(), 1);
    assert_eq!(fields[0].key, "loanTerm");
    assert_eq!(fields[0].frequency.percentage, 100);
}

#[test]
fn custom_descriptions_and_fallback() {
    let mut descriptions = FieldDescriptions::empty();
    descriptions.insert("cashback", "Cashback on purchases");
    let fields = FieldAnalyzer::new(descriptions).analyze(&products(vec![json!({
        "cashback": 1.5,
        "interestRate": 4,
        "minimumDeposit": 100,
    })]));

    let describe = |key: &str| {
        fields
            .iter()
            .find(|field| field.key == key)
            .map(|field| field.description.clone())
            .unwrap()
    };
    assert_eq!(describe("cashback"), "Cashback on purchases");
    assert_eq!(describe("interestRate"), "Interest Rate");
    assert_eq!(describe("minimumDeposit"), "Minimum Deposit");
}

#[test]
fn inference_on_stored_strings() {
    let cases = [
        (json!("42"), TypeTag::Number),
        (json!("2024"), TypeTag::Date),
        (json!("2024-03-15"), TypeTag::Date),
        (json!(""), TypeTag::String),
        (json!("abc"), TypeTag::String),
        (json!([]), TypeTag::Array),
        (json!([1, 2]), TypeTag::ArrayOf(Box::new(TypeTag::Integer))),
        (json!(null), TypeTag::Null),
        (json!({"a": 1}), TypeTag::Object),
        (json!(true), TypeTag::Boolean),
    ];
    for (raw, expected) in cases {
        assert_eq!(infer_type(&DetailValue::from(raw.clone())), expected, "inferring {raw}");
    }
}

#[test]
fn odd_product_columns_do_not_block_analysis() {
    let records = json!([
        {"id": 7, "details": {"loanTerm": 36}},
        {"id": "p2", "isActive": null, "details": {"loanTerm": 60}},
        {"id": "p3", "createdAt": "2024-01-15 10:00:00", "isFeatured": 1, "details": {"annualFee": 95}},
    ]);
    let all: Vec<Product> = serde_json::from_value(records).unwrap();

    let fields = FieldAnalyzer::default().analyze(&all);
    let term = fields.iter().find(|field| field.key == "loanTerm").unwrap();
    assert_eq!(term.frequency.percentage, 67);
    assert_eq!(term.type_tag, TypeTag::Integer);
    assert_eq!(all[0].id, "7");
}
