//! User account commands

use std::sync::Arc;

use crate::config::Config;
use crate::db::Store;
use crate::entities::users::Role;
use crate::models::CreateUser;
use crate::services::{Credentials, SeaOrmUserService, UserService};

async fn user_service(config: &Config) -> anyhow::Result<SeaOrmUserService> {
    let store = Store::new(&config.general.database_path).await?;
    let credentials = Arc::new(Credentials::new(&config.security)?);
    Ok(SeaOrmUserService::new(store, credentials))
}

pub async fn cmd_create_user(
    config: &Config,
    name: String,
    email: String,
    password: String,
    admin: bool,
) -> anyhow::Result<()> {
    let service = user_service(config).await?;

    let role = if admin {
        Role::Administrator
    } else {
        Role::Client
    };

    let user = service
        .create(CreateUser {
            name,
            email,
            password,
            role: Some(role),
        })
        .await?;

    println!("✓ Created user #{} <{}> ({})", user.id, user.email, user.role);
    Ok(())
}

pub async fn cmd_list_users(config: &Config, skip: u64, limit: u64) -> anyhow::Result<()> {
    let service = user_service(config).await?;
    let users = service.list(skip, limit).await?;

    if users.is_empty() {
        println!("No users yet.");
        println!();
        println!(
            "Create one with: eventos create-user --name <name> --email <email> --password <password>"
        );
        return Ok(());
    }

    let counts = service.counts().await?;
    println!(
        "Users ({} total, {} administrators, {} clients)",
        counts.total, counts.administrators, counts.clients
    );
    println!("{:-<70}", "");

    for user in users {
        println!(
            "#{:<5} {:<30} {:<13} {}",
            user.id,
            user.email,
            user.role.as_str(),
            user.name
        );
    }

    Ok(())
}
