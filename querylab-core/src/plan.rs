//! Cosmetic execution plans.
//!
//! Builds PostgreSQL-style plan text from keyword presence alone. Costs are
//! derived from the number of plan nodes so the output is stable for a given
//! query.

use regex::Regex;
use std::sync::OnceLock;

struct PlanPatterns {
    from_table: Regex,
    join_table: Regex,
    dml_target: Regex,
    where_clause: Regex,
    group_by: Regex,
    aggregate: Regex,
    order_by: Regex,
    limit: Regex,
    distinct: Regex,
    window: Regex,
}

fn patterns() -> &'static PlanPatterns {
    static PATTERNS: OnceLock<PlanPatterns> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        let re = |p: &str| Regex::new(&format!("(?i){}", p)).expect("plan pattern");
        PlanPatterns {
            from_table: re(r"\bFROM\s+([A-Za-z_][A-Za-z0-9_]*)"),
            join_table: re(r"\bJOIN\s+([A-Za-z_][A-Za-z0-9_]*)"),
            dml_target: re(
                r"^\s*(?:EXPLAIN\s+)?(INSERT\s+INTO|UPDATE|DELETE\s+FROM)\s+([A-Za-z_][A-Za-z0-9_]*)",
            ),
            where_clause: re(
                r"\bWHERE\s+(.+?)(?:\s+GROUP\s+BY\b|\s+ORDER\s+BY\b|\s+LIMIT\b|\s+HAVING\b|;|$)",
            ),
            group_by: re(r"\bGROUP\s+BY\b"),
            aggregate: re(r"\b(COUNT|SUM|AVG|MIN|MAX)\s*\("),
            order_by: re(r"\bORDER\s+BY\s+([^;]+?)(?:\s+LIMIT\b|;|$)"),
            limit: re(r"\bLIMIT\s+(\d+)"),
            distinct: re(r"\bSELECT\s+DISTINCT\b"),
            window: re(r"\bOVER\s*\("),
        }
    })
}

/// A plan node before costs are assigned, innermost last
struct Node {
    label: String,
    details: Vec<String>,
}

impl Node {
    fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            details: Vec::new(),
        }
    }

    fn detail(mut self, detail: impl Into<String>) -> Self {
        self.details.push(detail.into());
        self
    }
}

/// Render a plausible plan for `query`. Never returns an empty string.
pub fn execution_plan(query: &str) -> String {
    let p = patterns();
    let mut nodes: Vec<Node> = Vec::new();

    if let Some(caps) = p.dml_target.captures(query) {
        let verb = caps[1].split_whitespace().next().unwrap_or("Modify");
        let verb = match verb.to_ascii_uppercase().as_str() {
            "INSERT" => "Insert",
            "UPDATE" => "Update",
            _ => "Delete",
        };
        nodes.push(Node::new(format!("{} on {}", verb, &caps[2])));
    }

    if let Some(caps) = p.limit.captures(query) {
        nodes.push(Node::new("Limit").detail(format!("Rows: {}", &caps[1])));
    }
    if p.window.is_match(query) {
        nodes.push(Node::new("WindowAgg"));
    }
    if let Some(caps) = p.order_by.captures(query) {
        nodes.push(Node::new("Sort").detail(format!("Sort Key: {}", caps[1].trim())));
    }
    if p.distinct.is_match(query) {
        nodes.push(Node::new("Unique"));
    }
    if p.group_by.is_match(query) {
        nodes.push(Node::new("HashAggregate"));
    } else if p.aggregate.is_match(query) {
        nodes.push(Node::new("Aggregate"));
    }

    let tables: Vec<&str> = p
        .from_table
        .captures_iter(query)
        .chain(p.join_table.captures_iter(query))
        .filter_map(|c| c.get(1).map(|m| m.as_str()))
        .collect();
    let filter = p
        .where_clause
        .captures(query)
        .map(|c| format!("Filter: ({})", c[1].trim()));

    match tables.as_slice() {
        [] if nodes.is_empty() => nodes.push(Node::new("Result")),
        [] => {}
        [table] => {
            let mut scan = Node::new(format!("Seq Scan on {}", table));
            if let Some(filter) = filter {
                scan = scan.detail(filter);
            }
            nodes.push(scan);
        }
        [first, rest @ ..] => {
            nodes.push(Node::new("Hash Join").detail("Hash Cond: (join keys)"));
            let mut scan = Node::new(format!("Seq Scan on {}", first));
            if let Some(filter) = filter {
                scan = scan.detail(filter);
            }
            nodes.push(scan);
            for table in rest {
                nodes.push(Node::new("Hash"));
                nodes.push(Node::new(format!("Seq Scan on {}", table)));
            }
        }
    }

    render(&nodes)
}

fn render(nodes: &[Node]) -> String {
    let depth = nodes.len();
    let mut lines = Vec::new();
    for (i, node) in nodes.iter().enumerate() {
        // Outer nodes cost more than the ones they wrap
        let startup = (depth - i - 1) as f64 * 1.25;
        let total = startup + 1.05 + (depth - i) as f64 * 0.35;
        let rows = 4 * (i + 1);
        let indent = if i == 0 {
            String::new()
        } else {
            format!("{}->  ", "  ".repeat(i * 2 - 1))
        };
        lines.push(format!(
            "{}{}  (cost={:.2}..{:.2} rows={} width=64)",
            indent, node.label, startup, total, rows
        ));
        let pad = " ".repeat(indent.len() + 2);
        for detail in &node.details {
            lines.push(format!("{}{}", pad, detail));
        }
    }
    lines.join("\n")
}
