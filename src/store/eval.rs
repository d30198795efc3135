/*
 * Copyright (c) 2025-present Dawid Pawlik
 *
 * For educational use only by employees and students of MIMUW.
 * See LICENSE file for details.
 */

//! # In-process aggregation evaluator
//!
//! Evaluates the subset of the MongoDB aggregation language the reports use:
//!
//! - **Stages**: `$match`, `$project`, `$unwind`, `$group`, `$sort`, `$limit`
//! - **Query operators**: `$regex` (with `$options`), `$eq`, `$ne`, `$gt`,
//!   `$gte`, `$lt`, `$lte`, `$expr`
//! - **Expressions**: field paths, literals, `$concat`, `$ifNull`, `$toLower`,
//!   `$split`, `$eq`
//! - **Accumulators**: `$sum`
//!
//! Values compare with the server's cross-type ordering, and range operators
//! only match values of the same type class as their operand. Anything outside
//! the subset is rejected rather than guessed at.

use anyhow::Context;
use anyhow::Result;
use anyhow::bail;
use mongodb::bson::Bson;
use mongodb::bson::Document;
use regex::Regex;
use regex::RegexBuilder;
use std::cmp::Ordering;
use std::collections::HashMap;

/// Run every stage of `pipeline` over `documents` in order
pub(crate) fn run_pipeline(documents: Vec<Document>, pipeline: &[Document]) -> Result<Vec<Document>> {
    let mut documents = documents;

    for stage in pipeline {
        let (name, spec) = single_entry(stage, "pipeline stage")?;
        documents = match name {
            "$match" => match_stage(documents, as_document(spec, name)?)?,
            "$project" => project_stage(documents, as_document(spec, name)?)?,
            "$unwind" => unwind_stage(documents, spec)?,
            "$group" => group_stage(documents, as_document(spec, name)?)?,
            "$sort" => sort_stage(documents, as_document(spec, name)?)?,
            "$limit" => limit_stage(documents, spec)?,
            other => bail!("Unsupported pipeline stage '{}'", other),
        };
    }

    Ok(documents)
}

fn single_entry<'a>(document: &'a Document, what: &str) -> Result<(&'a str, &'a Bson)> {
    let mut entries = document.iter();
    match (entries.next(), entries.next()) {
        (Some((key, value)), None) => Ok((key.as_str(), value)),
        _ => bail!("Expected a single-key {}, got {}", what, document),
    }
}

fn as_document<'a>(value: &'a Bson, stage: &str) -> Result<&'a Document> {
    match value {
        Bson::Document(document) => Ok(document),
        other => bail!("{} expects a document, got {}", stage, other),
    }
}

// ============================================================================
// Values
// ============================================================================

/// Resolve a dotted field path; `None` when any step is missing
fn lookup<'a>(document: &'a Document, path: &str) -> Option<&'a Bson> {
    let mut parts = path.split('.');
    let mut current = document.get(parts.next()?)?;

    for part in parts {
        match current {
            Bson::Document(inner) => current = inner.get(part)?,
            _ => return None,
        }
    }

    Some(current)
}

fn as_f64(value: &Bson) -> Option<f64> {
    match value {
        Bson::Int32(v) => Some(*v as f64),
        Bson::Int64(v) => Some(*v as f64),
        Bson::Double(v) => Some(*v),
        _ => None,
    }
}

/// Position of a value's type in the server's comparison order
fn type_rank(value: &Bson) -> u8 {
    match value {
        Bson::MinKey => 0,
        Bson::Null | Bson::Undefined => 1,
        Bson::Int32(_) | Bson::Int64(_) | Bson::Double(_) | Bson::Decimal128(_) => 2,
        Bson::String(_) | Bson::Symbol(_) => 3,
        Bson::Document(_) => 4,
        Bson::Array(_) => 5,
        Bson::Binary(_) => 6,
        Bson::ObjectId(_) => 7,
        Bson::Boolean(_) => 8,
        Bson::DateTime(_) => 9,
        Bson::Timestamp(_) => 10,
        Bson::RegularExpression(_) => 11,
        Bson::MaxKey => 255,
        _ => 12,
    }
}

fn compare_values(a: &Bson, b: &Bson) -> Ordering {
    let rank = type_rank(a).cmp(&type_rank(b));
    if rank != Ordering::Equal {
        return rank;
    }

    match (a, b) {
        (Bson::String(x), Bson::String(y)) => x.cmp(y),
        (Bson::Boolean(x), Bson::Boolean(y)) => x.cmp(y),
        (Bson::DateTime(x), Bson::DateTime(y)) => {
            x.timestamp_millis().cmp(&y.timestamp_millis())
        }
        (Bson::ObjectId(x), Bson::ObjectId(y)) => x.bytes().cmp(&y.bytes()),
        _ => match (as_f64(a), as_f64(b)) {
            (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
            _ => Ordering::Equal,
        },
    }
}

fn values_equal(a: &Bson, b: &Bson) -> bool {
    match (as_f64(a), as_f64(b)) {
        (Some(x), Some(y)) => x == y,
        _ => match (a, b) {
            (Bson::Null | Bson::Undefined, Bson::Null | Bson::Undefined) => true,
            _ => a == b,
        },
    }
}

fn is_truthy(value: &Bson) -> bool {
    match value {
        Bson::Boolean(b) => *b,
        Bson::Null | Bson::Undefined => false,
        other => as_f64(other).is_none_or(|n| n != 0.0),
    }
}

// ============================================================================
// Expressions
// ============================================================================

fn eval_expr(document: &Document, expr: &Bson) -> Result<Bson> {
    match expr {
        Bson::String(s) if s.starts_with('$') => {
            Ok(lookup(document, &s[1..]).cloned().unwrap_or(Bson::Null))
        }
        Bson::Document(spec) if spec.keys().next().is_some_and(|k| k.starts_with('$')) => {
            let (operator, args) = single_entry(spec, "expression")?;
            eval_operator(document, operator, args)
        }
        Bson::Document(spec) => {
            let mut out = Document::new();
            for (key, value) in spec {
                out.insert(key.clone(), eval_expr(document, value)?);
            }
            Ok(Bson::Document(out))
        }
        Bson::Array(items) => Ok(Bson::Array(
            items
                .iter()
                .map(|item| eval_expr(document, item))
                .collect::<Result<Vec<_>>>()?,
        )),
        literal => Ok(literal.clone()),
    }
}

/// Evaluate operator arguments, accepting both `[a, b]` and a bare `a`
fn eval_args(document: &Document, args: &Bson) -> Result<Vec<Bson>> {
    match args {
        Bson::Array(items) => items.iter().map(|item| eval_expr(document, item)).collect(),
        single => Ok(vec![eval_expr(document, single)?]),
    }
}

fn exact_args<const N: usize>(operator: &str, args: Vec<Bson>) -> Result<[Bson; N]> {
    let count = args.len();
    args.try_into()
        .map_err(|_| anyhow::anyhow!("{} takes {} arguments, got {}", operator, N, count))
}

fn eval_operator(document: &Document, operator: &str, args: &Bson) -> Result<Bson> {
    let values = eval_args(document, args)?;

    match operator {
        "$ifNull" => {
            let [value, fallback] = exact_args::<2>(operator, values)?;
            Ok(match value {
                Bson::Null | Bson::Undefined => fallback,
                present => present,
            })
        }
        "$concat" => {
            let mut out = String::new();
            for value in values {
                match value {
                    Bson::String(s) => out.push_str(&s),
                    Bson::Null | Bson::Undefined => return Ok(Bson::Null),
                    other => bail!("$concat only supports strings, got {}", other),
                }
            }
            Ok(Bson::String(out))
        }
        "$toLower" => {
            let [value] = exact_args::<1>(operator, values)?;
            let lowered = match value {
                Bson::String(s) => s.to_ascii_lowercase(),
                Bson::Null | Bson::Undefined => String::new(),
                Bson::Int32(n) => n.to_string(),
                Bson::Int64(n) => n.to_string(),
                Bson::Double(n) => n.to_string(),
                other => bail!("$toLower cannot convert {}", other),
            };
            Ok(Bson::String(lowered))
        }
        "$split" => {
            let [value, delimiter] = exact_args::<2>(operator, values)?;
            match (value, delimiter) {
                (Bson::Null | Bson::Undefined, _) => Ok(Bson::Null),
                (Bson::String(s), Bson::String(d)) if !d.is_empty() => Ok(Bson::Array(
                    s.split(d.as_str())
                        .map(|part| Bson::String(part.to_string()))
                        .collect(),
                )),
                (value, delimiter) => {
                    bail!("$split needs a string and a non-empty delimiter, got {} and {}", value, delimiter)
                }
            }
        }
        "$eq" => {
            let [a, b] = exact_args::<2>(operator, values)?;
            Ok(Bson::Boolean(values_equal(&a, &b)))
        }
        other => bail!("Unsupported expression operator '{}'", other),
    }
}

// ============================================================================
// $match
// ============================================================================

enum Condition {
    Regex(Regex),
    Eq(Bson),
    Ne(Bson),
    Range(Bson, fn(Ordering) -> bool),
}

enum Clause {
    Field { path: String, conditions: Vec<Condition> },
    Expr(Bson),
}

impl Condition {
    fn matches(&self, value: Option<&Bson>) -> bool {
        let value = value.unwrap_or(&Bson::Null);
        match self {
            Condition::Regex(regex) => match value {
                Bson::String(s) => regex.is_match(s),
                _ => false,
            },
            Condition::Eq(operand) => values_equal(value, operand),
            Condition::Ne(operand) => !values_equal(value, operand),
            Condition::Range(operand, accept) => {
                type_rank(value) == type_rank(operand)
                    && !matches!(value, Bson::Null | Bson::Undefined)
                    && accept(compare_values(value, operand))
            }
        }
    }
}

fn build_regex(pattern: &str, options: &str) -> Result<Regex> {
    let mut builder = RegexBuilder::new(pattern);
    for flag in options.chars() {
        match flag {
            'i' => builder.case_insensitive(true),
            'm' => builder.multi_line(true),
            's' => builder.dot_matches_new_line(true),
            'x' => builder.ignore_whitespace(true),
            other => bail!("Unsupported $regex option '{}'", other),
        };
    }
    builder
        .build()
        .with_context(|| format!("Invalid $regex pattern '{}'", pattern))
}

fn parse_conditions(spec: &Bson) -> Result<Vec<Condition>> {
    let operators = match spec {
        Bson::Document(doc) if doc.keys().next().is_some_and(|k| k.starts_with('$')) => doc,
        literal => return Ok(vec![Condition::Eq(literal.clone())]),
    };

    let mut conditions = Vec::new();
    for (operator, operand) in operators {
        let condition = match operator.as_str() {
            "$regex" => {
                let Bson::String(pattern) = operand else {
                    bail!("$regex expects a string pattern, got {}", operand);
                };
                let options = operators.get_str("$options").unwrap_or("");
                Condition::Regex(build_regex(pattern, options)?)
            }
            // Consumed together with $regex
            "$options" => continue,
            "$eq" => Condition::Eq(operand.clone()),
            "$ne" => Condition::Ne(operand.clone()),
            "$gt" => Condition::Range(operand.clone(), Ordering::is_gt),
            "$gte" => Condition::Range(operand.clone(), Ordering::is_ge),
            "$lt" => Condition::Range(operand.clone(), Ordering::is_lt),
            "$lte" => Condition::Range(operand.clone(), Ordering::is_le),
            other => bail!("Unsupported query operator '{}'", other),
        };
        conditions.push(condition);
    }

    Ok(conditions)
}

fn parse_filter(filter: &Document) -> Result<Vec<Clause>> {
    filter
        .iter()
        .map(|(key, spec)| match key.as_str() {
            "$expr" => Ok(Clause::Expr(spec.clone())),
            other if other.starts_with('$') => bail!("Unsupported top-level operator '{}'", other),
            path => Ok(Clause::Field {
                path: path.to_string(),
                conditions: parse_conditions(spec)?,
            }),
        })
        .collect()
}

fn match_stage(documents: Vec<Document>, filter: &Document) -> Result<Vec<Document>> {
    let clauses = parse_filter(filter)?;
    let mut kept = Vec::with_capacity(documents.len());

    'documents: for document in documents {
        for clause in &clauses {
            let accepted = match clause {
                Clause::Field { path, conditions } => {
                    let value = lookup(&document, path);
                    conditions.iter().all(|c| c.matches(value))
                }
                Clause::Expr(expr) => is_truthy(&eval_expr(&document, expr)?),
            };
            if !accepted {
                continue 'documents;
            }
        }
        kept.push(document);
    }

    Ok(kept)
}

// ============================================================================
// $project, $unwind
// ============================================================================

fn project_stage(documents: Vec<Document>, spec: &Document) -> Result<Vec<Document>> {
    let mut keep_id = true;
    for (field, value) in spec {
        if field == "_id" && matches!(value, Bson::Boolean(false) | Bson::Int32(0) | Bson::Int64(0)) {
            keep_id = false;
        }
    }

    documents
        .into_iter()
        .map(|document| {
            let mut projected = Document::new();
            if keep_id && let Some(id) = document.get("_id") {
                projected.insert("_id", id.clone());
            }

            for (field, value) in spec {
                match value {
                    Bson::Boolean(false) | Bson::Int32(0) | Bson::Int64(0) if field == "_id" => {}
                    Bson::Boolean(false) | Bson::Int32(0) | Bson::Int64(0) => {
                        bail!("Field exclusion is only supported for _id, got '{}'", field)
                    }
                    Bson::Boolean(true) | Bson::Int32(1) | Bson::Int64(1) => {
                        if let Some(existing) = lookup(&document, field) {
                            projected.insert(field.clone(), existing.clone());
                        }
                    }
                    expr => {
                        projected.insert(field.clone(), eval_expr(&document, expr)?);
                    }
                }
            }

            Ok(projected)
        })
        .collect()
}

fn unwind_stage(documents: Vec<Document>, spec: &Bson) -> Result<Vec<Document>> {
    let path = match spec {
        Bson::String(path) => path.as_str(),
        Bson::Document(options) => options
            .get_str("path")
            .context("$unwind document needs a 'path'")?,
        other => bail!("$unwind expects a field path, got {}", other),
    };
    let Some(field) = path.strip_prefix('$').filter(|f| !f.contains('.')) else {
        bail!("$unwind supports top-level field paths only, got '{}'", path);
    };

    let mut unwound = Vec::new();
    for document in documents {
        match document.get(field) {
            Some(Bson::Array(items)) => {
                for item in items {
                    let mut copy = document.clone();
                    copy.insert(field, item.clone());
                    unwound.push(copy);
                }
            }
            None | Some(Bson::Null) | Some(Bson::Undefined) => {}
            Some(_) => unwound.push(document),
        }
    }

    Ok(unwound)
}

// ============================================================================
// $group
// ============================================================================

#[derive(Default, Clone, Copy)]
struct Sum {
    integer: i64,
    float: f64,
    saw_float: bool,
}

impl Sum {
    fn add(&mut self, value: &Bson) {
        match value {
            Bson::Int32(v) => self.integer = self.integer.saturating_add(*v as i64),
            Bson::Int64(v) => self.integer = self.integer.saturating_add(*v),
            Bson::Double(v) => {
                self.float += v;
                self.saw_float = true;
            }
            // Non-numeric values are ignored by $sum
            _ => {}
        }
    }

    fn finish(self) -> Bson {
        if self.saw_float {
            Bson::Double(self.float + self.integer as f64)
        } else if let Ok(small) = i32::try_from(self.integer) {
            Bson::Int32(small)
        } else {
            Bson::Int64(self.integer)
        }
    }
}

fn group_stage(documents: Vec<Document>, spec: &Document) -> Result<Vec<Document>> {
    let key_expr = spec.get("_id").context("$group needs an _id expression")?;

    let mut accumulators = Vec::new();
    for (field, accumulator) in spec.iter().filter(|(field, _)| field.as_str() != "_id") {
        let (operator, operand) = single_entry(as_document(accumulator, "$group field")?, "accumulator")?;
        if operator != "$sum" {
            bail!("Unsupported accumulator '{}'", operator);
        }
        accumulators.push((field.clone(), operand.clone()));
    }

    // Groups keep first-seen order; the index maps a key's debug form to its slot
    let mut groups: Vec<(Bson, Vec<Sum>)> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for document in &documents {
        let key = match eval_expr(document, key_expr)? {
            Bson::Undefined => Bson::Null,
            key => key,
        };
        let slot = *index.entry(format!("{:?}", key)).or_insert_with(|| {
            groups.push((key, vec![Sum::default(); accumulators.len()]));
            groups.len() - 1
        });

        for (sum, (_, operand)) in groups[slot].1.iter_mut().zip(&accumulators) {
            sum.add(&eval_expr(document, operand)?);
        }
    }

    Ok(groups
        .into_iter()
        .map(|(key, sums)| {
            let mut out = Document::new();
            out.insert("_id", key);
            for ((field, _), sum) in accumulators.iter().zip(sums) {
                out.insert(field.clone(), sum.finish());
            }
            out
        })
        .collect())
}

// ============================================================================
// $sort, $limit
// ============================================================================

fn sort_stage(mut documents: Vec<Document>, spec: &Document) -> Result<Vec<Document>> {
    let mut keys = Vec::new();
    for (path, direction) in spec {
        let descending = match as_f64(direction) {
            Some(d) if d == 1.0 => false,
            Some(d) if d == -1.0 => true,
            _ => bail!("$sort direction for '{}' must be 1 or -1, got {}", path, direction),
        };
        keys.push((path.as_str(), descending));
    }

    // Stable, so ties keep the order of the previous stage
    documents.sort_by(|a, b| {
        for (path, descending) in &keys {
            let left = lookup(a, path).unwrap_or(&Bson::Null);
            let right = lookup(b, path).unwrap_or(&Bson::Null);
            let ordering = compare_values(left, right);
            let ordering = if *descending { ordering.reverse() } else { ordering };
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        Ordering::Equal
    });

    Ok(documents)
}

fn limit_stage(mut documents: Vec<Document>, spec: &Bson) -> Result<Vec<Document>> {
    let limit = match as_f64(spec) {
        Some(n) if n >= 1.0 && n.fract() == 0.0 => n as usize,
        _ => bail!("$limit must be a positive integer, got {}", spec),
    };
    documents.truncate(limit);
    Ok(documents)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::doc;

    fn run(documents: Vec<Document>, pipeline: Vec<Document>) -> Vec<Document> {
        run_pipeline(documents, &pipeline).unwrap()
    }

    #[test]
    fn test_cross_type_ordering() {
        assert_eq!(compare_values(&Bson::Null, &Bson::Int32(0)), Ordering::Less);
        assert_eq!(compare_values(&Bson::Int64(5), &Bson::String("1".into())), Ordering::Less);
        assert_eq!(compare_values(&Bson::Int32(2), &Bson::Double(2.0)), Ordering::Equal);
        assert_eq!(
            compare_values(&Bson::String("2015-01-01".into()), &Bson::String("2014-12-31".into())),
            Ordering::Greater
        );
    }

    #[test]
    fn test_range_only_matches_same_type() {
        let documents = vec![
            doc! { "published": "2015-06-01T10:00:00Z" },
            doc! { "published": 20150601 },
            doc! { "published": null },
            doc! {},
        ];

        let out = run(
            documents,
            vec![doc! { "$match": { "published": { "$gte": "2015", "$lte": "2016" } } }],
        );

        assert_eq!(out.len(), 1);
        assert_eq!(out[0].get_str("published").unwrap(), "2015-06-01T10:00:00Z");
    }

    #[test]
    fn test_regex_with_options() {
        let documents = vec![
            doc! { "media-type": "News" },
            doc! { "media-type": "NEWS" },
            doc! { "media-type": "newsletter" },
            doc! { "media-type": 7 },
        ];

        let out = run(
            documents,
            vec![doc! { "$match": { "media-type": { "$regex": "^news$", "$options": "i" } } }],
        );

        assert_eq!(out.len(), 2);
    }

    #[test]
    fn test_ne_matches_missing_field() {
        let documents = vec![doc! { "w": "" }, doc! { "w": "a" }, doc! {}];

        let out = run(documents, vec![doc! { "$match": { "w": { "$ne": "" } } }]);

        assert_eq!(out.len(), 2);
    }

    #[test]
    fn test_expression_operators() {
        let document = doc! { "title": "Hello World", "n": null };

        let concat = eval_expr(
            &document,
            &Bson::Document(doc! { "$concat": [ { "$ifNull": ["$content", ""] }, " ", "$title" ] }),
        )
        .unwrap();
        assert_eq!(concat, Bson::String(" Hello World".into()));

        let lower = eval_expr(&document, &Bson::Document(doc! { "$toLower": "$title" })).unwrap();
        assert_eq!(lower, Bson::String("hello world".into()));

        let missing_lower = eval_expr(&document, &Bson::Document(doc! { "$toLower": "$n" })).unwrap();
        assert_eq!(missing_lower, Bson::String(String::new()));

        let split = eval_expr(&document, &Bson::Document(doc! { "$split": ["a  b", " "] })).unwrap();
        assert_eq!(
            split,
            Bson::Array(vec!["a".into(), "".into(), "b".into()])
        );

        let concat_null = eval_expr(&document, &Bson::Document(doc! { "$concat": ["$n", "x"] })).unwrap();
        assert_eq!(concat_null, Bson::Null);
    }

    #[test]
    fn test_unwind_group_sort_limit() {
        let documents = vec![
            doc! { "tags": ["a", "b", "a"] },
            doc! { "tags": ["b", "c"] },
            doc! { "tags": [] },
            doc! { "tags": null },
        ];

        let out = run(
            documents,
            vec![
                doc! { "$unwind": "$tags" },
                doc! { "$group": { "_id": "$tags", "count": { "$sum": 1 } } },
                doc! { "$sort": { "count": -1 } },
                doc! { "$limit": 2 },
            ],
        );

        assert_eq!(out.len(), 2);
        // a and b tie at 2; the stable sort keeps first-seen order
        assert_eq!(out[0], doc! { "_id": "a", "count": 2 });
        assert_eq!(out[1], doc! { "_id": "b", "count": 2 });
    }

    #[test]
    fn test_group_keeps_null_key_distinct() {
        let documents = vec![
            doc! { "source": "CNN" },
            doc! { "source": null },
            doc! {},
            doc! { "source": "CNN" },
        ];

        let out = run(
            documents,
            vec![doc! { "$group": { "_id": "$source", "count": { "$sum": 1 } } }],
        );

        assert_eq!(out, vec![
            doc! { "_id": "CNN", "count": 2 },
            doc! { "_id": null, "count": 2 },
        ]);
    }

    #[test]
    fn test_project_keeps_id_and_computes_fields() {
        let documents = vec![doc! { "_id": 1, "title": "t", "extra": true }];

        let out = run(
            documents,
            vec![doc! { "$project": { "title": 1, "published": { "$ifNull": ["$published", ""] } } }],
        );

        assert_eq!(out, vec![doc! { "_id": 1, "title": "t", "published": "" }]);
    }

    #[test]
    fn test_rejects_unsupported_stage() {
        let err = run_pipeline(vec![], &[doc! { "$lookup": {} }]).unwrap_err();
        assert!(err.to_string().contains("$lookup"));
    }
}
