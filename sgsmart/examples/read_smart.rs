use sgsmart::AttributeNames;

fn main() -> sgsmart::Result<()> {
    let device = std::env::args().nth(1).unwrap_or_else(|| "sda".to_owned());
    let names = AttributeNames::standard();

    let data = sgsmart::connect(&device)?.read_smart_data()?;

    println!("revision {}, captured at {} ms", data.revision(), data.timestamp_ms());
    for attr in data.attributes(&names) {
        println!("{:>3} {:<32} {}", attr.id, attr.description, attr.value);
    }

    Ok(())
}
