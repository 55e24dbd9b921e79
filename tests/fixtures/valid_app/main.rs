fn main() {
    println!("valid app up");
}
