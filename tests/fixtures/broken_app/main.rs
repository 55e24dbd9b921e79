fn main() {
    let greeting: u32 = "not a number";
    println!("{}", greeting)
}
