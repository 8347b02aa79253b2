pub mod in_memory_registry_context;
