use std::env::args;

use anyhow::Result;
use log::{error, info};
use serde::{Deserialize, Serialize};

use jsondb::Driver;

#[derive(Debug, Serialize, Deserialize)]
struct Address {
    city: String,
    state: String,
    country: String,
    postal_code: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct User {
    name: String,
    age: u32,
    contact: String,
    company: String,
    address: Address,
}

fn user(name: &str, age: u32, company: &str, city: &str) -> User {
    User {
        name: name.to_owned(),
        age,
        contact: "12345678912".to_owned(),
        company: company.to_owned(),
        address: Address {
            city: city.to_owned(),
            state: "Sindh".to_owned(),
            country: "Pakistan".to_owned(),
            postal_code: "12345".to_owned(),
        },
    }
}

fn run(dir: &str) -> Result<()> {
    let db = Driver::new(dir)?;
    info!("jsondb {} at {:?}", jsondb::VERSION, db.dir());

    let users = vec![
        user("Waqar", 23, "Google", "Karachi"),
        user("Uzair", 22, "Facebook", "Larkana"),
        user("Ahmed", 27, "Microsoft", "Karachi"),
    ];
    for u in &users {
        if let Err(e) = db.write("users", &u.name, u) {
            error!("can't write {}: {:#}", u.name, e);
        }
    }

    let records = db.read_all("users")?;
    println!("-------------------> Records <-------------------");
    for record in &records {
        print!("{}", record);
    }

    let all_users = records
        .iter()
        .map(|r| serde_json::from_str::<User>(r))
        .collect::<std::result::Result<Vec<_>, _>>()?;
    println!("-------------------> All Users <-------------------");
    for u in &all_users {
        println!("{:?}", u);
    }
    Ok(())
}

fn main() {
    pretty_env_logger::init();
    let dir = args().nth(1).unwrap_or_else(|| "./db".to_owned());
    if let Err(e) = run(&dir) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
