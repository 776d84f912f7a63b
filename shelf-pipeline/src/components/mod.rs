pub mod action_priority_filter;
pub mod expired_filter;
pub mod near_expiry_filter;
pub mod needs_reorder_filter;
pub mod product_name_filter;
pub mod top_k_selector;
