use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow, bail};

use canvas::api::{
    Article, ArticleInput, ContentClient, IdeaStatus, NewIdea, SectionInput, parse_tags,
};
use canvas::article::{ArticleView, slugify};
use canvas::auth::{AuthService, FileSessionStore};
use canvas::catalog::Catalog;
use canvas::guard::{self, Access, RouteRequirement};
use canvas::{Config, article_to_html, not_found_html, render_with};

use crate::{AdminCommand, BookmarksCommand, Format, IdeasCommand, PublishArgs};

type Auth = AuthService<ContentClient, FileSessionStore>;

pub fn render(config: &Config, input: &Path, output: Option<&Path>, format: Format) -> Result<()> {
    let document = fs::read_to_string(input)
        .with_context(|| format!("Error reading {}", input.display()))?;
    let nodes = render_with(&document, &config.render_options());

    let rendered = match format {
        Format::Html => canvas::nodes_to_html(&nodes),
        Format::Json => serde_json::to_string_pretty(&nodes)?,
    };
    emit(&rendered, output)
}

pub fn article(config: &Config, slug: &str, output: Option<&Path>) -> Result<()> {
    let client = ContentClient::new(config)?;
    let page = match Catalog::bundled().article_or_bundled(slug, client.article_by_slug(slug)) {
        Some(article) => article_to_html(&article, &config.render_options()),
        None => {
            log::warn!("no article with slug `{slug}`");
            not_found_html()
        }
    };
    emit(&page, output)
}

pub fn articles(
    config: &Config,
    section: Option<&str>,
    latest: Option<usize>,
    featured: bool,
) -> Result<()> {
    let client = ContentClient::new(config)?;
    let catalog = Catalog::bundled();
    let articles = if featured {
        catalog
            .featured_or_bundled(client.featured_article())
            .into_iter()
            .collect()
    } else if let Some(section) = section {
        catalog.section_or_bundled(section, client.articles_by_section(section))
    } else if let Some(count) = latest {
        let featured = catalog.featured_or_bundled(client.featured_article());
        // One extra in case the featured article is among them.
        let fetched = client.latest_articles(count + 1);
        catalog.latest_or_bundled(count, featured.as_ref(), fetched)
    } else {
        catalog.all_or_bundled(client.articles())
    };

    if articles.is_empty() {
        println!("No articles found.");
    }
    for article in &articles {
        print_article(article);
    }
    Ok(())
}

pub fn sections(config: &Config) -> Result<()> {
    let client = ContentClient::new(config)?;
    for section in client.sections()? {
        match section.description.as_deref().filter(|d| !d.is_empty()) {
            Some(description) => println!("{}  {}  {description}", section.slug, section.name),
            None => println!("{}  {}", section.slug, section.name),
        }
    }
    Ok(())
}

pub fn login(config: &Config, identifier: &str, password: &str) -> Result<()> {
    let mut auth = auth_service(config)?;
    let user = auth.login(identifier, password)?;
    println!("Signed in as {}", user.username);
    Ok(())
}

pub fn register(config: &Config, username: &str, email: &str, password: &str) -> Result<()> {
    let mut auth = auth_service(config)?;
    let user = auth.register(username, email, password)?;
    println!("Welcome, {}", user.username);
    Ok(())
}

pub fn logout(config: &Config) -> Result<()> {
    // Signing out only forgets the local session; the CMS is not contacted.
    let mut auth = auth_service(config)?;
    auth.logout()?;
    println!("Signed out");
    Ok(())
}

pub fn whoami(config: &Config) -> Result<()> {
    let auth = signed_in(config, RouteRequirement::authenticated(), "/profile")?;
    let user = auth.user().ok_or_else(|| anyhow!("not signed in"))?;
    println!("{} <{}>", user.username, user.email);
    println!("role: {:?}", auth.role());
    Ok(())
}

pub fn ideas(config: &Config, command: IdeasCommand) -> Result<()> {
    match command {
        IdeasCommand::List => {
            let client = ContentClient::new(config)?;
            for idea in client.approved_ideas()? {
                let by = idea
                    .user
                    .as_ref()
                    .map(|user| user.username.as_str())
                    .unwrap_or("Anonymous");
                println!("{:>4}  {}  {} (by {by})", idea.votes, idea.document_id, idea.title);
            }
        }
        IdeasCommand::Mine => {
            let auth = signed_in(config, RouteRequirement::authenticated(), "/ideas")?;
            let user_id = user_id(&auth)?;
            for idea in auth.backend().ideas_by_user(user_id)? {
                println!("{:<8}  {}  {}", idea.status.as_str(), idea.document_id, idea.title);
            }
        }
        IdeasCommand::Submit {
            title,
            content,
            category,
        } => {
            let auth = signed_in(config, RouteRequirement::authenticated(), "/ideas")?;
            let user_id = user_id(&auth)?;
            let idea = auth.backend().submit_idea(
                user_id,
                &NewIdea {
                    title,
                    content,
                    category,
                },
            )?;
            println!("Submitted `{}` for review", idea.title);
        }
        IdeasCommand::Vote { document_id } => {
            let auth = signed_in(config, RouteRequirement::authenticated(), "/ideas")?;
            let client = auth.backend();
            let idea = client
                .approved_ideas()?
                .into_iter()
                .find(|idea| idea.document_id == document_id)
                .ok_or_else(|| anyhow!("no approved idea `{document_id}`"))?;
            let idea = client.vote_idea(&idea)?;
            println!("`{}` now has {} votes", idea.title, idea.votes);
        }
    }
    Ok(())
}

pub fn bookmarks(config: &Config, command: BookmarksCommand) -> Result<()> {
    let auth = signed_in(config, RouteRequirement::authenticated(), "/bookmarks")?;
    let user_id = user_id(&auth)?;
    let client = auth.backend();

    match command {
        BookmarksCommand::List => {
            let bookmarks = client.bookmarks_for_user(user_id)?;
            if bookmarks.is_empty() {
                println!("No bookmarks yet.");
            }
            for bookmark in bookmarks {
                if let Some(article) = &bookmark.article {
                    print_article(&ArticleView::from(article));
                }
            }
        }
        BookmarksCommand::Add { slug } => {
            let article = find_article(client, &slug)?;
            if client.bookmark_for_article(user_id, article.id)?.is_some() {
                println!("`{}` is already bookmarked", article.title);
            } else {
                client.add_bookmark(user_id, article.id)?;
                println!("Bookmarked `{}`", article.title);
            }
        }
        BookmarksCommand::Remove { slug } => {
            let article = find_article(client, &slug)?;
            match client.bookmark_for_article(user_id, article.id)? {
                Some(bookmark) => {
                    client.remove_bookmark(&bookmark.document_id)?;
                    println!("Removed bookmark for `{}`", article.title);
                }
                None => println!("`{}` is not bookmarked", article.title),
            }
        }
    }
    Ok(())
}

pub fn admin(config: &Config, command: AdminCommand) -> Result<()> {
    let auth = signed_in(config, RouteRequirement::admin(), "/admin")?;
    let client = auth.backend();

    match command {
        AdminCommand::Articles => {
            for article in client.articles()? {
                println!("{}  {}", article.document_id, article.title);
            }
        }
        AdminCommand::DeleteArticle { document_id } => {
            client.delete_article(&document_id)?;
            println!("Deleted article {document_id}");
        }
        AdminCommand::Publish(args) => {
            let update = args.update.clone();
            let input = article_input(args)?;
            let article = match update {
                Some(document_id) => client.update_article(&document_id, &input)?,
                None => client.create_article(&input)?,
            };
            println!("Saved `{}` ({})", article.title, article.document_id);
        }
        AdminCommand::Ideas => {
            for idea in client.all_ideas()? {
                println!(
                    "{:<8}  {:>4}  {}  {}",
                    idea.status.as_str(),
                    idea.votes,
                    idea.document_id,
                    idea.title
                );
            }
        }
        AdminCommand::IdeaStatus {
            document_id,
            status,
        } => {
            let status: IdeaStatus = status.parse().map_err(|e: String| anyhow!(e))?;
            let idea = client.set_idea_status(&document_id, status)?;
            println!("`{}` is now {}", idea.title, idea.status.as_str());
        }
        AdminCommand::Sections => {
            for section in client.sections()? {
                println!(
                    "{}  {:>3}  {}  {}",
                    section.document_id,
                    section.order.unwrap_or_default(),
                    section.slug,
                    section.name
                );
            }
        }
        AdminCommand::Section(args) => {
            let slug = args.slug.unwrap_or_else(|| slugify(&args.name));
            let input = SectionInput {
                name: args.name,
                slug,
                description: args.description,
                order: args.order,
            };
            let section = match args.update {
                Some(document_id) => client.update_section(&document_id, &input)?,
                None => client.create_section(&input)?,
            };
            println!("Saved section `{}` ({})", section.name, section.document_id);
        }
        AdminCommand::DeleteSection { document_id } => {
            client.delete_section(&document_id)?;
            println!("Deleted section {document_id}");
        }
    }
    Ok(())
}

/// An auth service over the saved session file. Nothing is loaded yet.
fn auth_service(config: &Config) -> Result<Auth> {
    let client = ContentClient::new(config)?;
    let store = FileSessionStore::new(config.session_path());
    Ok(AuthService::new(client, store))
}

/// Restore the session, check it against `requirement`, and authorize the client.
fn signed_in(config: &Config, requirement: RouteRequirement, location: &str) -> Result<Auth> {
    let mut auth = auth_service(config)?;
    auth.restore();
    match guard::check(requirement, auth.state(), location) {
        Access::Allow => {}
        Access::Pending => bail!("session is still being restored"),
        Access::RedirectToLogin { from } => {
            bail!("{from} requires signing in; run `canvas login` first")
        }
        Access::RedirectHome { error } => bail!(error),
    }

    let token = auth.token().map(str::to_string);
    auth.backend_mut().set_token(token);
    Ok(auth)
}

fn user_id(auth: &Auth) -> Result<u64> {
    auth.user()
        .map(|user| user.id)
        .ok_or_else(|| anyhow!("not signed in"))
}

fn find_article(client: &ContentClient, slug: &str) -> Result<Article> {
    client
        .article_by_slug(slug)?
        .ok_or_else(|| anyhow!("no article with slug `{slug}`"))
}

fn article_input(args: PublishArgs) -> Result<ArticleInput> {
    let content = fs::read_to_string(&args.file)
        .with_context(|| format!("Error reading {}", args.file.display()))?;
    let slug = args.slug.unwrap_or_else(|| slugify(&args.title));
    if slug.is_empty() {
        bail!("cannot derive a slug from `{}`; pass --slug", args.title);
    }

    Ok(ArticleInput {
        title: args.title,
        slug,
        excerpt: args.excerpt,
        content,
        author: args.author,
        author_bio: args.author_bio,
        read_time: args.read_time,
        section: args.section.filter(|section| !section.is_empty()),
        subsection: args.subsection,
        image_url: args.image_url,
        tags: parse_tags(&args.tags),
        featured: args.featured,
    })
}

fn print_article(article: &ArticleView) {
    println!(
        "{}  {}  [{}]  {}",
        article.date, article.id, article.section, article.title
    );
    if !article.excerpt.is_empty() {
        println!("    {}", article.excerpt);
    }
}

fn emit(content: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            fs::write(path, content)
                .with_context(|| format!("Error writing {}", path.display()))?;
            println!("Created {}", path.display());
        }
        None => print!("{content}"),
    }
    Ok(())
}
