//! Stream command handlers.

use std::path::Path;
use std::str::FromStr;

use anyhow::{Context, Result, bail};
use vidra_client::error::ApiError;
use vidra_types::{CreateStreamRequest, Stream, UpdateStreamRequest, Visibility};

use crate::cli::App;

/// Converts an API failure into the user-facing message for this CLI.
fn render(err: ApiError) -> anyhow::Error {
    anyhow::anyhow!(err.user_message())
}

pub async fn list(app: &App, limit: Option<u64>, all: bool) -> Result<()> {
    let limit = limit.unwrap_or(app.config.page_limit);

    let page = if all {
        app.client.list_all(limit).await.map_err(render)?
    } else {
        app.client.list_more(limit).await.map_err(render)?
    };

    if page.items.is_empty() {
        println!("No streams found.");
        return Ok(());
    }

    for stream in &page.items {
        println!(
            "{}  [{}]  {}  {}",
            stream.id, stream.status, stream.visibility, stream.title
        );
    }
    println!("({} of {} streams loaded)", page.items.len(), page.total);
    Ok(())
}

pub async fn show(app: &App, id: &str) -> Result<()> {
    let stream = app.client.get_stream(id).await.map_err(render)?;
    print_stream(&stream);
    Ok(())
}

pub async fn create(
    app: &App,
    title: String,
    description: String,
    visibility: &str,
    tags: Vec<String>,
) -> Result<()> {
    let visibility = parse_visibility(visibility)?;
    let stream = app
        .client
        .create_stream(&CreateStreamRequest {
            title,
            description,
            visibility,
            tags,
        })
        .await
        .map_err(render)?;

    println!("Created stream {}", stream.id);
    Ok(())
}

pub async fn edit(
    app: &App,
    id: &str,
    title: Option<String>,
    description: Option<String>,
    visibility: Option<String>,
    tags: Vec<String>,
) -> Result<()> {
    let visibility = visibility.as_deref().map(parse_visibility).transpose()?;
    let request = UpdateStreamRequest {
        title,
        description,
        visibility,
        tags: if tags.is_empty() { None } else { Some(tags) },
    };

    if request.title.is_none()
        && request.description.is_none()
        && request.visibility.is_none()
        && request.tags.is_none()
    {
        bail!("Nothing to change. Pass at least one of --title/--description/--visibility/--tag.");
    }

    let stream = app.client.update_stream(id, &request).await.map_err(render)?;
    println!("Updated stream {}", stream.id);
    Ok(())
}

pub async fn delete(app: &App, id: &str) -> Result<()> {
    app.client.delete_stream(id).await.map_err(render)?;
    println!("Deleted stream {id}");
    Ok(())
}

pub async fn upload(app: &App, id: &str, file: &str) -> Result<()> {
    let path = Path::new(file);
    let bytes = std::fs::read(path).with_context(|| format!("read video file {file}"))?;
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("video")
        .to_string();
    let mime = mime_for(&file_name);

    app.client
        .upload_video(id, &file_name, mime, bytes)
        .await
        .map_err(render)?;

    println!("Uploaded {file_name} to stream {id}");
    Ok(())
}

pub async fn download(app: &App, id: &str, output: Option<String>) -> Result<()> {
    let video = app.client.download_video(id).await.map_err(render)?;

    let dest = output.unwrap_or_else(|| format!("{id}.mp4"));
    video
        .persist(Path::new(&dest))
        .with_context(|| format!("save video to {dest}"))?;

    println!("Saved video to {dest}");
    Ok(())
}

fn print_stream(stream: &Stream) {
    println!("id:          {}", stream.id);
    println!("title:       {}", stream.title);
    println!("status:      {}", stream.status);
    println!("visibility:  {}", stream.visibility);
    println!("owner:       {}", stream.owner_id);
    if let Some(tags) = &stream.tags
        && !tags.is_empty()
    {
        println!("tags:        {}", tags.join(", "));
    }
    if !stream.description.is_empty() {
        println!("description: {}", stream.description);
    }
    println!("created:     {}", stream.created_at.to_rfc3339());
    if let Some(published) = stream.published_at {
        println!("published:   {}", published.to_rfc3339());
    }
}

fn parse_visibility(value: &str) -> Result<Visibility> {
    Visibility::from_str(value).map_err(|e| anyhow::anyhow!(e))
}

fn mime_for(file_name: &str) -> &'static str {
    match file_name.rsplit('.').next() {
        Some("webm") => "video/webm",
        Some("mov") => "video/quicktime",
        Some("mkv") => "video/x-matroska",
        _ => "video/mp4",
    }
}
