//! Built-in scenarios: literal demo tables and the patterns that select them.
//!
//! Order matters. Statement families anchored at the start of the query come
//! first, then the more specific SELECT shapes before the general ones.

use super::ResultBuilder;
use crate::value::{ResultSet, Scalar};

pub const FALLBACK_SCENARIO: &str = "welcome";

pub(super) static RULES: &[(&str, &[&str], ResultBuilder)] = &[
    ("explain_plan", &[r"^\s*EXPLAIN\b"], explain_plan),
    ("insert_row", &[r"^\s*INSERT\b"], insert_row),
    ("update_rows", &[r"^\s*UPDATE\b"], update_rows),
    ("delete_rows", &[r"^\s*DELETE\b"], delete_rows),
    ("create_object", &[r"^\s*CREATE\b"], create_object),
    ("drop_object", &[r"^\s*DROP\b"], drop_object),
    ("alter_table", &[r"^\s*ALTER\b"], alter_table),
    (
        "recursive_hierarchy",
        &[r"\bWITH\s+RECURSIVE\b", r"org_hierarchy|employee|manager"],
        org_hierarchy,
    ),
    ("recursive_sequence", &[r"\bWITH\s+RECURSIVE\b"], factorial_sequence),
    (
        "window_ranking",
        &[
            r"\b(ROW_NUMBER|RANK|DENSE_RANK|NTILE|PERCENT_RANK|LAG|LEAD)\s*\(",
            r"sales|salesperson|region|revenue",
        ],
        sales_ranking,
    ),
    ("window_running_total", &[r"\bOVER\s*\("], running_totals),
    ("common_table_expression", &[r"\bWITH\s+\w+\s+AS\s*\("], course_summary),
    ("left_join", &[r"\b(LEFT|RIGHT|FULL)\s+(OUTER\s+)?JOIN\b"], students_left_join),
    (
        "course_join",
        &[r"\bJOIN\b", r"\b(courses|enrollments)\b"],
        student_courses,
    ),
    ("generic_join", &[r"\bJOIN\b"], customer_orders),
    (
        "group_by_having",
        &[r"\bGROUP\s+BY\b", r"\bHAVING\b"],
        popular_courses,
    ),
    ("group_by", &[r"\bGROUP\s+BY\b"], students_per_course),
    ("count_aggregate", &[r"\bCOUNT\s*\("], student_counts),
    ("numeric_aggregate", &[r"\b(AVG|SUM|MIN|MAX)\s*\("], gpa_statistics),
    ("select_distinct", &[r"\bSELECT\s+DISTINCT\b"], distinct_courses),
    ("filter_by_gpa", &[r"\bWHERE\b", r"\bgpa\b"], honor_students),
    ("filter_rows", &[r"\bWHERE\b"], active_students),
    ("order_and_limit", &[r"\b(ORDER\s+BY|LIMIT)\b"], students_by_gpa),
    ("select_courses", &[r"\bFROM\s+courses\b"], courses),
    ("select_enrollments", &[r"\bFROM\s+enrollments\b"], enrollments),
    ("select_employees", &[r"\bFROM\s+employees\b"], employees),
    ("select_students", &[r"\bFROM\s+students\b"], students),
];

fn status_row(rows_affected: i64, message: &str) -> ResultSet {
    ResultSet::new(
        &["status", "rows_affected", "message"],
        vec![vec!["success".into(), rows_affected.into(), message.into()]],
    )
}

pub(super) fn welcome() -> ResultSet {
    ResultSet::new(
        &["message", "example_queries"],
        vec![vec![
            "Welcome to the SQL playground! This query didn't match a demo scenario, try one of the examples.".into(),
            "SELECT * FROM students; | SELECT COUNT(*) FROM students; | \
             SELECT course, AVG(gpa) FROM students GROUP BY course; | \
             SELECT s.name, c.title FROM students s JOIN enrollments e ON s.id = e.student_id JOIN courses c ON c.id = e.course_id; | \
             SELECT name, RANK() OVER (ORDER BY total_sales DESC) FROM sales; | \
             INSERT INTO students (name, course) VALUES ('Eve', 'Physics');"
                .into(),
        ]],
    )
}

fn explain_plan() -> ResultSet {
    ResultSet::new(
        &["node", "detail", "cost", "rows"],
        vec![
            vec![
                "Sort".into(),
                "Sort Key: gpa DESC".into(),
                "1.07..1.08".into(),
                3.into(),
            ],
            vec![
                "-> Seq Scan on students".into(),
                "Filter: (status = 'active')".into(),
                "0.00..1.05".into(),
                3.into(),
            ],
        ],
    )
}

fn insert_row() -> ResultSet {
    ResultSet::new(
        &["status", "rows_affected", "message", "last_insert_id"],
        vec![vec![
            "success".into(),
            1.into(),
            "1 row inserted".into(),
            5.into(),
        ]],
    )
}

fn update_rows() -> ResultSet {
    status_row(2, "2 rows updated")
}

fn delete_rows() -> ResultSet {
    status_row(1, "1 row deleted")
}

fn create_object() -> ResultSet {
    status_row(0, "Object created successfully")
}

fn drop_object() -> ResultSet {
    status_row(0, "Object dropped successfully")
}

fn alter_table() -> ResultSet {
    status_row(0, "Table altered successfully")
}

fn org_hierarchy() -> ResultSet {
    ResultSet::new(
        &["id", "name", "title", "manager_id", "level", "path"],
        vec![
            vec![
                1.into(),
                "Grace Hopper".into(),
                "CEO".into(),
                Scalar::Null,
                1.into(),
                "Grace Hopper".into(),
            ],
            vec![
                2.into(),
                "Alan Turing".into(),
                "CTO".into(),
                1.into(),
                2.into(),
                "Grace Hopper > Alan Turing".into(),
            ],
            vec![
                3.into(),
                "Ada Lovelace".into(),
                "VP Engineering".into(),
                2.into(),
                3.into(),
                "Grace Hopper > Alan Turing > Ada Lovelace".into(),
            ],
            vec![
                4.into(),
                "Linus Torvalds".into(),
                "Senior Engineer".into(),
                3.into(),
                4.into(),
                "Grace Hopper > Alan Turing > Ada Lovelace > Linus Torvalds".into(),
            ],
            vec![
                5.into(),
                "Margaret Hamilton".into(),
                "CFO".into(),
                1.into(),
                2.into(),
                "Grace Hopper > Margaret Hamilton".into(),
            ],
        ],
    )
}

fn factorial_sequence() -> ResultSet {
    ResultSet::new(
        &["n", "factorial"],
        vec![
            vec![1.into(), 1.into()],
            vec![2.into(), 2.into()],
            vec![3.into(), 6.into()],
            vec![4.into(), 24.into()],
            vec![5.into(), 120.into()],
        ],
    )
}

fn sales_ranking() -> ResultSet {
    let row = |name: &str, region: &str, total: i64, rank: i64, dense: i64, number: i64| -> Vec<Scalar> {
        vec![
            name.into(),
            region.into(),
            total.into(),
            rank.into(),
            dense.into(),
            number.into(),
        ]
    };
    ResultSet::new(
        &[
            "name",
            "region",
            "total_sales",
            "rank",
            "dense_rank",
            "row_number",
        ],
        vec![
            row("Sarah Chen", "West", 152_000, 1, 1, 1),
            row("Marcus Lee", "East", 148_500, 2, 2, 2),
            row("Priya Patel", "West", 148_500, 2, 2, 3),
            row("Tom Brooks", "North", 97_250, 4, 3, 4),
        ],
    )
}

fn running_totals() -> ResultSet {
    ResultSet::new(
        &["month", "revenue", "running_total", "moving_avg_3m"],
        vec![
            vec!["2024-01".into(), 12_000.into(), 12_000.into(), 12_000.0.into()],
            vec!["2024-02".into(), 15_500.into(), 27_500.into(), 13_750.0.into()],
            vec!["2024-03".into(), 9_800.into(), 37_300.into(), 12_433.33.into()],
            vec!["2024-04".into(), 17_250.into(), 54_550.into(), 14_183.33.into()],
        ],
    )
}

fn course_summary() -> ResultSet {
    ResultSet::new(
        &["course", "enrolled_students", "avg_gpa", "honors_students"],
        vec![
            vec!["Computer Science".into(), 2.into(), 3.35.into(), 1.into()],
            vec!["Physics".into(), 1.into(), 3.9.into(), 1.into()],
            vec!["Mathematics".into(), 1.into(), 3.2.into(), 0.into()],
        ],
    )
}

fn students_left_join() -> ResultSet {
    ResultSet::new(
        &["student_name", "course_title", "grade"],
        vec![
            vec![
                "Alice Johnson".into(),
                "Introduction to Programming".into(),
                "A".into(),
            ],
            vec!["Alice Johnson".into(), "Data Structures".into(), "A-".into()],
            vec!["Bob Smith".into(), "Linear Algebra".into(), "B+".into()],
            vec!["Carol Davis".into(), "Classical Mechanics".into(), "A".into()],
            vec![
                "David Wilson".into(),
                "Introduction to Programming".into(),
                Scalar::Null,
            ],
            vec!["Eve Martinez".into(), Scalar::Null, Scalar::Null],
        ],
    )
}

fn student_courses() -> ResultSet {
    let row = |student: &str, course: &str, instructor: &str, grade: Option<&str>| -> Vec<Scalar> {
        vec![
            student.into(),
            course.into(),
            instructor.into(),
            grade.into(),
        ]
    };
    ResultSet::new(
        &["student_name", "course_title", "instructor", "grade"],
        vec![
            row(
                "Alice Johnson",
                "Introduction to Programming",
                "Dr. Ada Park",
                Some("A"),
            ),
            row("Alice Johnson", "Data Structures", "Dr. Alan Reyes", Some("A-")),
            row("Bob Smith", "Linear Algebra", "Dr. Emmy Clarke", Some("B+")),
            row("Carol Davis", "Classical Mechanics", "Dr. Isaac Moore", Some("A")),
            row(
                "David Wilson",
                "Introduction to Programming",
                "Dr. Ada Park",
                None,
            ),
        ],
    )
}

fn customer_orders() -> ResultSet {
    ResultSet::new(
        &["order_id", "customer", "product", "amount", "order_date"],
        vec![
            vec![
                1001.into(),
                "Acme Corp".into(),
                "Laptop".into(),
                1299.99.into(),
                "2024-01-15".into(),
            ],
            vec![
                1002.into(),
                "Globex".into(),
                "Monitor".into(),
                349.5.into(),
                "2024-01-18".into(),
            ],
            vec![
                1003.into(),
                "Acme Corp".into(),
                "Keyboard".into(),
                89.0.into(),
                "2024-02-02".into(),
            ],
        ],
    )
}

fn popular_courses() -> ResultSet {
    ResultSet::new(
        &["course", "student_count", "avg_gpa"],
        vec![vec!["Computer Science".into(), 2.into(), 3.35.into()]],
    )
}

fn students_per_course() -> ResultSet {
    ResultSet::new(
        &["course", "student_count", "avg_gpa"],
        vec![
            vec!["Computer Science".into(), 2.into(), 3.35.into()],
            vec!["Mathematics".into(), 1.into(), 3.2.into()],
            vec!["Physics".into(), 1.into(), 3.9.into()],
        ],
    )
}

fn student_counts() -> ResultSet {
    ResultSet::new(
        &["total_students", "active_students", "new_enrollments"],
        vec![vec![4.into(), 3.into(), 1.into()]],
    )
}

fn gpa_statistics() -> ResultSet {
    ResultSet::new(
        &["avg_gpa", "highest_gpa", "lowest_gpa", "total_credits"],
        vec![vec![3.45.into(), 3.9.into(), 2.9.into(), 412.into()]],
    )
}

fn distinct_courses() -> ResultSet {
    ResultSet::new(
        &["course"],
        vec![
            vec!["Computer Science".into()],
            vec!["Mathematics".into()],
            vec!["Physics".into()],
        ],
    )
}

fn honor_students() -> ResultSet {
    ResultSet::new(
        &["id", "name", "course", "gpa"],
        vec![
            vec![3.into(), "Carol Davis".into(), "Physics".into(), 3.9.into()],
            vec![
                1.into(),
                "Alice Johnson".into(),
                "Computer Science".into(),
                3.8.into(),
            ],
        ],
    )
}

fn students_by_gpa() -> ResultSet {
    ResultSet::new(
        &["name", "course", "gpa"],
        vec![
            vec!["Carol Davis".into(), "Physics".into(), 3.9.into()],
            vec!["Alice Johnson".into(), "Computer Science".into(), 3.8.into()],
            vec!["Bob Smith".into(), "Mathematics".into(), 3.2.into()],
            vec!["David Wilson".into(), "Computer Science".into(), 2.9.into()],
        ],
    )
}

fn courses() -> ResultSet {
    let row = |id: i64, code: &str, title: &str, instructor: &str, credits: i64, dept: &str| -> Vec<Scalar> {
        vec![
            id.into(),
            code.into(),
            title.into(),
            instructor.into(),
            credits.into(),
            dept.into(),
        ]
    };
    ResultSet::new(
        &["id", "code", "title", "instructor", "credits", "department"],
        vec![
            row(
                101,
                "CS101",
                "Introduction to Programming",
                "Dr. Ada Park",
                4,
                "Computer Science",
            ),
            row(
                102,
                "CS201",
                "Data Structures",
                "Dr. Alan Reyes",
                4,
                "Computer Science",
            ),
            row(
                201,
                "MATH210",
                "Linear Algebra",
                "Dr. Emmy Clarke",
                3,
                "Mathematics",
            ),
            row(
                301,
                "PHYS150",
                "Classical Mechanics",
                "Dr. Isaac Moore",
                4,
                "Physics",
            ),
        ],
    )
}

fn enrollments() -> ResultSet {
    let row = |id: i64, student: i64, course: i64, semester: &str, grade: Option<&str>| -> Vec<Scalar> {
        vec![
            id.into(),
            student.into(),
            course.into(),
            semester.into(),
            grade.into(),
        ]
    };
    ResultSet::new(
        &["id", "student_id", "course_id", "semester", "grade"],
        vec![
            row(1, 1, 101, "Fall 2022", Some("A")),
            row(2, 1, 102, "Spring 2023", Some("A-")),
            row(3, 2, 201, "Fall 2023", Some("B+")),
            row(4, 3, 301, "Fall 2021", Some("A")),
            row(5, 4, 101, "Fall 2024", None),
        ],
    )
}

fn employees() -> ResultSet {
    let row = |id: i64, name: &str, title: &str, dept: &str, salary: i64, manager: Option<i64>| -> Vec<Scalar> {
        vec![
            id.into(),
            name.into(),
            title.into(),
            dept.into(),
            salary.into(),
            manager.into(),
        ]
    };
    ResultSet::new(
        &["id", "name", "title", "department", "salary", "manager_id"],
        vec![
            row(1, "Grace Hopper", "CEO", "Executive", 250_000, None),
            row(2, "Alan Turing", "CTO", "Engineering", 210_000, Some(1)),
            row(3, "Ada Lovelace", "VP Engineering", "Engineering", 180_000, Some(2)),
            row(4, "Linus Torvalds", "Senior Engineer", "Engineering", 150_000, Some(3)),
            row(5, "Margaret Hamilton", "CFO", "Finance", 205_000, Some(1)),
        ],
    )
}

fn students() -> ResultSet {
    let row = |id: i64, name: &str, course: &str, year: i64, gpa: f64, enrolled: &str, status: &str| -> Vec<Scalar> {
        vec![
            id.into(),
            name.into(),
            course.into(),
            year.into(),
            gpa.into(),
            enrolled.into(),
            status.into(),
        ]
    };
    ResultSet::new(
        &[
            "id",
            "name",
            "course",
            "year",
            "gpa",
            "enrollment_date",
            "status",
        ],
        vec![
            row(1, "Alice Johnson", "Computer Science", 3, 3.8, "2022-09-01", "active"),
            row(2, "Bob Smith", "Mathematics", 2, 3.2, "2023-09-01", "active"),
            row(3, "Carol Davis", "Physics", 4, 3.9, "2021-09-01", "active"),
            row(4, "David Wilson", "Computer Science", 1, 2.9, "2024-09-01", "inactive"),
        ],
    )
}

fn active_students() -> ResultSet {
    ResultSet::new(
        &[
            "id",
            "name",
            "course",
            "year",
            "gpa",
            "enrollment_date",
            "status",
        ],
        vec![
            vec![
                1.into(),
                "Alice Johnson".into(),
                "Computer Science".into(),
                3.into(),
                3.8.into(),
                "2022-09-01".into(),
                "active".into(),
            ],
            vec![
                2.into(),
                "Bob Smith".into(),
                "Mathematics".into(),
                2.into(),
                3.2.into(),
                "2023-09-01".into(),
                "active".into(),
            ],
            vec![
                3.into(),
                "Carol Davis".into(),
                "Physics".into(),
                4.into(),
                3.9.into(),
                "2021-09-01".into(),
                "active".into(),
            ],
        ],
    )
}
