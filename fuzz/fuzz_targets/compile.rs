#![no_main]

use arbitrary::Arbitrary;
use itertools::Itertools;
use libfuzzer_sys::fuzz_target;
use serde_json::{Value as Json, json};

#[derive(Debug, Clone, Arbitrary)]
enum Scalar {
    Null,
    Bool(bool),
    Int(i32),
    Float(f64),
    Text(String),
}

impl Scalar {
    fn to_json(&self) -> Json {
        match self {
            Scalar::Null => Json::Null,
            Scalar::Bool(b) => json!(b),
            Scalar::Int(n) => json!(n),
            Scalar::Float(f) => serde_json::Number::from_f64(*f).map_or(Json::Null, Json::Number),
            Scalar::Text(s) => json!(s),
        }
    }
}

#[derive(Debug, Clone, Arbitrary)]
enum Node {
    Operator(u8, Vec<Scalar>),
    Scalar(String, Scalar),
    Field(String, Vec<Node>),
    Logic(u8, Vec<Node>),
    Regex(String, String, String),
}

const OPERATORS: &[&str] = &[
    "$eq", "$ne", "$gt", "$gte", "$lt", "$lte", "$in", "$nin", "$sub", "$nsub", "$sup", "$nsup", "$con",
    "$ncon", "$incl", "$nincl", "$bits", "$nbits", "$exists", "$typeof", "$ntypeof", "$match", "$nmatch",
];

const LOGIC: &[&str] = &["$and", "$or", "$nor", "$not"];

impl Node {
    fn to_json(&self, depth: usize) -> (String, Json) {
        match self {
            Node::Operator(kind, operands) => {
                let name = OPERATORS[*kind as usize % OPERATORS.len()].to_string();
                let operand = match operands.as_slice() {
                    [single] => single.to_json(),
                    many => Json::Array(many.iter().map(Scalar::to_json).collect_vec()),
                };
                (name, operand)
            }
            Node::Scalar(name, value) => (name.clone(), value.to_json()),
            Node::Field(name, children) if depth > 0 => (name.clone(), object(children, depth - 1)),
            Node::Logic(kind, children) if depth > 0 => (
                LOGIC[*kind as usize % LOGIC.len()].to_string(),
                Json::Array(children.iter().map(|c| object(std::slice::from_ref(c), depth - 1)).collect_vec()),
            ),
            Node::Regex(name, source, flags) => (name.clone(), json!({"$regex": source, "$flags": flags})),
            Node::Field(name, _) => (name.clone(), Json::Null),
            Node::Logic(_, _) => ("$and".to_string(), json!([{}])),
        }
    }
}

fn object(nodes: &[Node], depth: usize) -> Json {
    Json::Object(nodes.iter().map(|n| n.to_json(depth)).collect())
}

#[derive(Debug, Clone, Arbitrary)]
struct Context {
    filter: Vec<Node>,
    sort: Option<Vec<Node>>,
    records: Vec<Vec<(String, Scalar)>>,
}

fuzz_target!(|context: Context| {
    let Ok(filter) = ajoq_lang::from_json(object(&context.filter, 4)) else {
        return;
    };
    let sort = context
        .sort
        .as_deref()
        .map(|nodes| ajoq_lang::from_json(object(nodes, 4)))
        .transpose();

    let records = context
        .records
        .iter()
        .map(|fields| {
            ajoq_lang::Value::from(Json::Object(
                fields.iter().map(|(k, v)| (k.clone(), v.to_json())).collect(),
            ))
        })
        .collect_vec();

    if let Ok(filter) = ajoq_lang::create_filter(&filter) {
        let _ = filter.filter(&records);
    }

    if let Ok(sort) = sort
        && let Ok(sort) = ajoq_lang::create_sort(sort.as_ref())
    {
        let mut records = records;
        sort.sort(&mut records);
    }
});
