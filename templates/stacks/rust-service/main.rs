fn main() {
    println!("{{organization}} rust-service {{version}}");
}
