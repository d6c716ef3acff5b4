// Copyright @yucwang 2021

use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_NODE_ID: AtomicU64 = AtomicU64::new(1);

/// Generate a unique default ID for a computation node.
pub fn generate_node_id(type_name: &str) -> String {
    let seq = NEXT_NODE_ID.fetch_add(1, Ordering::Relaxed);
    format!("{}_{}", type_name, seq)
}

pub trait ComputationNode {
    /// Return the unique identifier for this computation node.
    fn id(&self) -> &str;

    fn class_name(&self) -> &'static str;

    // Output string for a single computation node.
    fn to_string(&self) -> String {
        format!("{}[id = \"{}\"]", self.class_name(), self.id())
    }
}

#[cfg(test)]
mod tests {
    use super::{generate_node_id, ComputationNode};

    struct Named(String);

    impl ComputationNode for Named {
        fn id(&self) -> &str {
            &self.0
        }

        fn class_name(&self) -> &'static str {
            "Named"
        }
    }

    #[test]
    fn test_generated_ids_are_unique() {
        let a = generate_node_id("medium");
        let b = generate_node_id("medium");
        assert!(a.starts_with("medium_"));
        assert_ne!(a, b);
        assert_eq!(Named(a.clone()).to_string(), format!("Named[id = \"{}\"]", a));
    }
}
