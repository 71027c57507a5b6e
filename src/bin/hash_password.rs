//! Prints an argon2 digest for each password given on the command line,
//! for seeding `users.password_hash` by hand.

use anyhow::{anyhow, bail};
use diligence_backend::utils::crypto::hash_password;

fn main() -> anyhow::Result<()> {
    let passwords: Vec<String> = std::env::args().skip(1).collect();
    if passwords.is_empty() {
        bail!("usage: hash-password <password> [<password> ...]");
    }

    for password in &passwords {
        let digest = hash_password(password).map_err(|e| anyhow!("hashing failed: {}", e))?;
        println!("{}", digest);
    }
    Ok(())
}
