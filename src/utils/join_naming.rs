//! Centralized naming for joined tables and their accessors.
//!
//! All joined-table and accessor names MUST come from these functions so the
//! planner output and the emitted code agree on every identifier.
//!
//! ## Naming Convention
//! - Joined table: `join_{sorted tables joined by "__"}`
//! - Accessor: `join_{sorted tables joined by "__"}`
//!
//! Table names are ALWAYS sorted, so the name of a combination does not
//! depend on the order its members were discovered in.
//!
//! Both schemes are injective only for tables accepted by
//! [`is_valid_table_name`]: an ASCII identifier that never contains `__` and
//! does not end in `_`. Under that rule every `__` in a generated name is a
//! separator, so snake_case table names stay recoverable and a single table
//! `a_b` never shares an accessor with the pair `{a, b}`.
//!
//! Examples:
//! - `["users", "orders"]` → `"join_orders__users"`
//! - accessor for `["order_items"]` → `"join_order_items"`
//! - accessor for `["order_items", "orders"]` → `"join_order_items__orders"`

const JOINED_PREFIX: &str = "join_";
const JOINED_SEPARATOR: &str = "__";

fn sorted_names(tables: &[impl AsRef<str>]) -> Vec<String> {
    let mut names: Vec<String> = tables.iter().map(|s| s.as_ref().to_string()).collect();
    names.sort();
    names
}

/// Name of the joined table holding exactly `tables`.
///
/// # Examples
/// ```
/// use ormjoin::utils::join_naming::generate_joined_table_name;
///
/// assert_eq!(generate_joined_table_name(&["users", "orders"]), "join_orders__users");
/// assert_eq!(generate_joined_table_name(&["orders", "users"]), "join_orders__users");
/// ```
pub fn generate_joined_table_name(tables: &[impl AsRef<str>]) -> String {
    format!("{}{}", JOINED_PREFIX, sorted_names(tables).join(JOINED_SEPARATOR))
}

/// Accessor method that joins the tables in `tables` into the receiver.
///
/// # Examples
/// ```
/// use ormjoin::utils::join_naming::generate_accessor_name;
///
/// assert_eq!(generate_accessor_name(&["users"]), "join_users");
/// assert_eq!(generate_accessor_name(&["users", "carts"]), "join_carts__users");
/// ```
pub fn generate_accessor_name(tables: &[impl AsRef<str>]) -> String {
    format!("{}{}", JOINED_PREFIX, sorted_names(tables).join(JOINED_SEPARATOR))
}

/// Whether `name` can take part in generated names without ambiguity.
///
/// # Examples
/// ```
/// use ormjoin::utils::join_naming::is_valid_table_name;
///
/// assert!(is_valid_table_name("order_items"));
/// assert!(!is_valid_table_name("order__items"));
/// assert!(!is_valid_table_name("orders_"));
/// assert!(!is_valid_table_name("2fa_codes"));
/// ```
pub fn is_valid_table_name(name: &str) -> bool {
    let mut chars = name.chars();
    let valid_start = chars.next().is_some_and(|c| c.is_ascii_alphabetic());
    valid_start
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        && !name.contains(JOINED_SEPARATOR)
        && !name.ends_with('_')
}

/// Recover the member tables from a joined-table name.
///
/// # Returns
/// * `Some(Vec<String>)` - Member tables (sorted)
/// * `None` - If the name is not a joined-table name
///
/// # Examples
/// ```
/// use ormjoin::utils::join_naming::extract_tables_from_joined_name;
///
/// assert_eq!(
///     extract_tables_from_joined_name("join_order_items__orders"),
///     Some(vec!["order_items".to_string(), "orders".to_string()])
/// );
/// assert_eq!(extract_tables_from_joined_name("users"), None);
/// ```
pub fn extract_tables_from_joined_name(name: &str) -> Option<Vec<String>> {
    let stripped = name.strip_prefix(JOINED_PREFIX)?;
    let tables: Vec<String> = stripped
        .split(JOINED_SEPARATOR)
        .map(|s| s.to_string())
        .collect();

    if tables.len() < 2 || tables.iter().any(|t| t.is_empty()) {
        return None;
    }
    Some(tables)
}
