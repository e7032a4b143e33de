use std::path::PathBuf;

use anyhow::{anyhow, Result};
use clap::{Arg, Command};
use tracing::info;

use nextcloud_upload::{
    config::Config,
    models::RemotePath,
    services::webdav::WebDAVUploader,
};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let env_filter = match tracing_subscriber::EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => tracing_subscriber::EnvFilter::new("info")
            .add_directive("nextcloud_upload=info".parse()?),
    };

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .init();

    let matches = Command::new("nextcloud-upload")
        .about("Upload a local directory tree or file to Nextcloud over WebDAV")
        .arg(
            Arg::new("source")
                .help("Local directory (uploaded recursively) or single file")
                .required(true)
                .index(1),
        )
        .arg(
            Arg::new("target")
                .help("Remote directory to upload into, relative to the WebDAV root")
                .required(true)
                .index(2),
        )
        .arg(
            Arg::new("url")
                .help("Nextcloud server URL (overrides NEXTCLOUD_URL)")
                .long("url")
                .value_name("URL"),
        )
        .arg(
            Arg::new("user")
                .help("Username (overrides NEXTCLOUD_USER)")
                .long("user")
                .short('u')
                .value_name("USER"),
        )
        .arg(
            Arg::new("password")
                .help("Password or app token (overrides NEXTCLOUD_PASSWORD)")
                .long("password")
                .short('p')
                .value_name("PASSWORD"),
        )
        .arg(
            Arg::new("server-type")
                .help("nextcloud, owncloud or generic (overrides NEXTCLOUD_SERVER_TYPE)")
                .long("server-type")
                .value_name("TYPE"),
        )
        .get_matches();

    let mut config = Config::from_env()?;
    if let Some(url) = matches.get_one::<String>("url") {
        config.server_url = Some(url.clone());
    }
    if let Some(user) = matches.get_one::<String>("user") {
        config.username = Some(user.clone());
    }
    if let Some(password) = matches.get_one::<String>("password") {
        config.password = Some(password.clone());
    }
    if let Some(server_type) = matches.get_one::<String>("server-type") {
        config.server_type = server_type.to_lowercase();
    }

    let source = matches
        .get_one::<String>("source")
        .map(PathBuf::from)
        .ok_or_else(|| anyhow!("missing source path"))?;
    let target = matches
        .get_one::<String>("target")
        .ok_or_else(|| anyhow!("missing target directory"))?;
    let target = RemotePath::parse(target)?;

    let uploader = WebDAVUploader::new_with_retry(config.webdav_config()?, config.retry_config())?;
    info!("Using WebDAV endpoint {}", uploader.connection().config().webdav_url());

    if source.is_dir() {
        let summary = uploader.sync_directory(&source, &target).await?;
        info!(
            "Done: {} files, {} directories",
            summary.files_uploaded,
            summary.directories_total()
        );
    } else if source.is_file() {
        let bytes = uploader.upload_file(&source, &target, true).await?;
        info!("Done: {} bytes", bytes);
    } else {
        return Err(anyhow!("Source {} does not exist", source.display()));
    }

    Ok(())
}
