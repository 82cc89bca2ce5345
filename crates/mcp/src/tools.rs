//! Tool names served by the two lavka MCP servers.

/// Products server tools
pub struct ProductTools;

/// Orders server tools
pub struct OrderTools;

pub const LIST_PRODUCTS: &str = "list_products";
pub const GET_PRODUCT: &str = "get_product";
pub const ADD_PRODUCT: &str = "add_product";
pub const GET_STATISTICS: &str = "get_statistics";

pub const CREATE_ORDER: &str = "create_order";
pub const LIST_ORDERS: &str = "list_orders";
pub const GET_ORDER: &str = "get_order";
pub const GET_ORDERS_STATISTICS: &str = "get_orders_statistics";

/// Tool category trait
pub trait ToolCategory {
    /// Category name, also the server subcommand
    fn category_name() -> &'static str
    where
        Self: Sized;
    /// List of tool names in this category
    fn tool_names() -> &'static [&'static str]
    where
        Self: Sized;
}

impl ToolCategory for ProductTools {
    fn category_name() -> &'static str {
        "products"
    }
    fn tool_names() -> &'static [&'static str] {
        &[LIST_PRODUCTS, GET_PRODUCT, ADD_PRODUCT, GET_STATISTICS]
    }
}

impl ToolCategory for OrderTools {
    fn category_name() -> &'static str {
        "orders"
    }
    fn tool_names() -> &'static [&'static str] {
        &[CREATE_ORDER, LIST_ORDERS, GET_ORDER, GET_ORDERS_STATISTICS]
    }
}

/// Which tool server a `lavka-mcp` process runs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum ServerKind {
    Products,
    Orders,
}

impl ServerKind {
    pub fn as_arg(&self) -> &'static str {
        match self {
            Self::Products => ProductTools::category_name(),
            Self::Orders => OrderTools::category_name(),
        }
    }
}
