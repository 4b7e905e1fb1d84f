use anyhow::Context;

use crate::auth::hash_password;

pub fn handle(password: &str) -> anyhow::Result<()> {
    if password.is_empty() {
        anyhow::bail!("password must not be empty");
    }

    let digest = hash_password(password).context("failed to hash password")?;
    println!("{}", digest);
    Ok(())
}
