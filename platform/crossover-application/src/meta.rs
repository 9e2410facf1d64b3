pub fn engine_name() -> &'static str {
    "crossover"
}
