use std::process;
use std::sync::Arc;

use time::OffsetDateTime;
use tracing::{Dispatch, Level, dispatcher, error, info, warn};
use tracing_subscriber::fmt as tracing_fmt;

use wayfare::application::error::AppError;
use wayfare::application::feed::{FeedQuery, FeedService};
use wayfare::application::gateway::{AuthGateway, GeocodeGateway, PostsGateway};
use wayfare::application::guard::{self, GateOutcome};
use wayfare::application::posts::{ComposerInput, EditorInput, PostService};
use wayfare::application::session::{SessionService, SessionStore};
use wayfare::config;
use wayfare::domain::entities::PostRecord;
use wayfare::domain::error::DomainError;
use wayfare::domain::types::{SortKey, Theme};
use wayfare::infra::auth::AuthBackend;
use wayfare::infra::error::InfraError;
use wayfare::infra::geocode::ReverseGeocoder;
use wayfare::infra::rest::RestBackend;
use wayfare::infra::session::FileSessionStore;
use wayfare::infra::telemetry;
use wayfare::presentation::views;
use wayfare::util::input;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        report_application_error(&error);
        process::exit(1);
    }
}

fn report_application_error(error: &AppError) {
    if dispatcher::has_been_set() {
        error!(error = %error, "application error");
        return;
    }

    let subscriber = tracing_fmt().with_max_level(Level::ERROR).finish();
    let dispatch = Dispatch::new(subscriber);
    dispatcher::with_default(&dispatch, || {
        error!(error = %error, "application error");
    });
}

async fn run() -> Result<(), AppError> {
    let (cli_args, settings) = config::load_with_cli()
        .map_err(|err| AppError::unexpected(format!("failed to load configuration: {err}")))?;

    telemetry::init(&settings.logging).map_err(AppError::from)?;

    let command = cli_args
        .command
        .unwrap_or(config::Command::Feed(config::FeedArgs::default()));

    let app = AppContext::build(&settings)?;

    match command {
        config::Command::Feed(args) => run_feed(&app, args).await,
        config::Command::Show(args) => run_show(&app, args).await,
        config::Command::Create(args) => run_create(&app, *args).await,
        config::Command::Edit(args) => run_edit(&app, *args).await,
        config::Command::Delete(args) => run_delete(&app, args).await,
        config::Command::Like(args) => run_like(&app, args).await,
        config::Command::Comment(args) => run_comment(&app, args).await,
        config::Command::Login(args) => run_login(&app, args).await,
        config::Command::Logout => run_logout(&app).await,
        config::Command::Whoami(args) => run_whoami(&app, args).await,
        config::Command::Theme(args) => run_theme(&app, args),
    }
}

struct AppContext {
    feed: FeedService,
    posts: PostService,
    session: SessionService,
}

impl AppContext {
    fn build(settings: &config::Settings) -> Result<Self, AppError> {
        let backend_url = settings.backend.url.as_deref().ok_or_else(|| {
            InfraError::configuration(
                "backend url is not configured (use --backend-url or WAYFARE_BACKEND_URL)",
            )
        })?;
        let api_key = settings.backend.api_key.clone().ok_or_else(|| {
            InfraError::configuration("backend api key is not configured (set WAYFARE_API_KEY)")
        })?;

        let store: Arc<FileSessionStore> =
            Arc::new(FileSessionStore::new(settings.session.file.clone()));

        // Signed-in calls carry the cached access token; everything else
        // falls back to the anonymous key.
        let bearer = store
            .load()
            .ok()
            .flatten()
            .and_then(|session| session.account)
            .map(|account| account.access_token);

        let rest = RestBackend::new(backend_url, api_key.clone(), settings.backend.table.clone())?
            .with_bearer(bearer);
        let posts_gateway: Arc<dyn PostsGateway> = Arc::new(rest);

        let auth: Arc<dyn AuthGateway> = Arc::new(AuthBackend::new(backend_url, api_key)?);

        let geocode: Option<Arc<dyn GeocodeGateway>> = match settings.geocode.api_key.clone() {
            Some(key) => Some(Arc::new(ReverseGeocoder::new(&settings.geocode.url, key)?)),
            None => None,
        };

        Ok(Self {
            feed: FeedService::new(posts_gateway.clone()),
            posts: PostService::new(posts_gateway, geocode),
            session: SessionService::new(auth, store),
        })
    }
}

async fn render_feed_view(app: &AppContext, query: &FeedQuery, show_content: bool) -> Result<(), AppError> {
    let session = app.session.restore();
    let page = app.feed.page(query).await?;
    print!(
        "{}",
        views::render_feed(&page, show_content, session.theme, OffsetDateTime::now_utc())
    );
    Ok(())
}

async fn run_feed(app: &AppContext, args: config::FeedArgs) -> Result<(), AppError> {
    let query = FeedQuery {
        search: args.search,
        travel_type: args.travel_type,
        sort: Some(args.sort.map_or(SortKey::CreatedAt, SortKey::from)),
    };
    render_feed_view(app, &query, args.content).await
}

async fn run_show(app: &AppContext, args: config::ShowArgs) -> Result<(), AppError> {
    match app.posts.load_detail(args.id).await {
        Ok(detail) => {
            let session = app.session.restore();
            print!(
                "{}",
                views::render_detail(
                    &detail,
                    &session.display_identity(),
                    OffsetDateTime::now_utc()
                )
            );
            Ok(())
        }
        Err(AppError::Domain(DomainError::PostNotFound { id })) => {
            // The detail view falls back to the listing when the record is
            // gone, instead of dead-ending.
            warn!(id, "post not found; returning to the feed");
            render_feed_view(app, &default_query(), false).await
        }
        Err(err) => Err(err),
    }
}

fn default_query() -> FeedQuery {
    FeedQuery {
        sort: Some(SortKey::CreatedAt),
        ..FeedQuery::default()
    }
}

async fn run_create(app: &AppContext, args: config::CreateArgs) -> Result<(), AppError> {
    let session = app.session.restore();
    let story = input::read_opt_value(args.story, args.story_file)?;
    let coordinates = args
        .coords
        .as_deref()
        .map(input::parse_coords)
        .transpose()?;

    let composer = ComposerInput {
        title: args.title,
        location: args.location,
        travel_type: args.travel_type,
        photos: args.photos,
        story,
        secret: args.secret.unwrap_or_default(),
        repost_of: args.repost_of,
        coordinates,
    };

    match app.posts.create(&session.display_identity(), composer).await {
        Ok(record) => {
            info!(id = record.id, "post created");
            println!("Post created successfully! (id {})", record.id);
            render_feed_view(app, &default_query(), false).await
        }
        Err(AppError::Gateway(err)) => {
            error!(error = %err, "failed to create post");
            Err(AppError::unexpected(format!("Error creating post: {err}")))
        }
        Err(err) => Err(err),
    }
}

async fn run_edit(app: &AppContext, args: config::EditArgs) -> Result<(), AppError> {
    let session = app.session.restore();

    let post = match app.posts.require(args.id).await {
        Ok(post) => post,
        Err(AppError::Domain(DomainError::PostNotFound { id })) => {
            warn!(id, "post not found; returning to the feed");
            return render_feed_view(app, &default_query(), false).await;
        }
        Err(err) => return Err(err),
    };

    require_owner_gate(&post, &session.display_identity(), args.secret.as_deref())?;

    let story = input::read_opt_value(args.story, args.story_file)?;
    let editor = EditorInput {
        title: args.title,
        location: args.location,
        travel_type: args.travel_type,
        photos: args.photos,
        story,
    };

    match app.posts.update(&post, editor).await {
        Ok(()) => {
            println!("Journey updated.");
            render_feed_view(app, &default_query(), false).await
        }
        Err(AppError::Gateway(err)) => {
            error!(error = %err, "failed to update post");
            Err(AppError::unexpected(
                "Error updating post. Please try again.",
            ))
        }
        Err(err) => Err(err),
    }
}

async fn run_delete(app: &AppContext, args: config::DeleteArgs) -> Result<(), AppError> {
    let session = app.session.restore();
    let post = app.posts.require(args.id).await?;

    require_owner_gate(&post, &session.display_identity(), args.secret.as_deref())?;

    let confirmed = args.yes
        || input::confirm(
            "Are you sure you want to delete this post? This action cannot be undone.",
        )?;
    if !confirmed {
        println!("Delete aborted.");
        return Ok(());
    }

    match app.posts.delete(post.id).await {
        Ok(()) => {
            println!("Post deleted.");
            render_feed_view(app, &default_query(), false).await
        }
        Err(AppError::Gateway(err)) => {
            error!(error = %err, "failed to delete post");
            Err(AppError::unexpected("Error deleting post"))
        }
        Err(err) => Err(err),
    }
}

/// The owner-action flow: visibility hint first, then the secret gate.
fn require_owner_gate(
    post: &PostRecord,
    viewer: &str,
    secret: Option<&str>,
) -> Result<(), AppError> {
    if !guard::owner_actions_visible(post, viewer) {
        return Err(AppError::validation(
            "owner actions are only available to the post's author",
        ));
    }
    match guard::challenge(post, secret) {
        GateOutcome::Authorized => Ok(()),
        GateOutcome::AwaitingSecret => Err(AppError::validation(
            "enter the post's secret key with --secret",
        )),
        GateOutcome::Rejected => Err(AppError::validation("Incorrect secret key!")),
    }
}

async fn run_like(app: &AppContext, args: config::LikeArgs) -> Result<(), AppError> {
    let mut post = app.posts.require(args.id).await?;
    match app.posts.like(&mut post).await {
        Ok(()) => {
            println!("❤ {} Likes on \"{}\"", post.like, post.title);
            Ok(())
        }
        Err(AppError::Gateway(err)) => {
            error!(error = %err, "failed to update likes");
            Err(AppError::unexpected("Error updating likes"))
        }
        Err(err) => Err(err),
    }
}

async fn run_comment(app: &AppContext, args: config::CommentArgs) -> Result<(), AppError> {
    let session = app.session.restore();
    let text = input::read_opt_value(args.text, args.text_file)?.unwrap_or_default();

    let mut post = app.posts.require(args.id).await?;
    let author = session.display_identity();
    match app.posts.add_comment(&mut post, &author, &text).await {
        Ok(()) => {
            println!("Comment by {author} added to \"{}\".", post.title);
            Ok(())
        }
        Err(AppError::Gateway(err)) => {
            error!(error = %err, "failed to add comment");
            Err(AppError::unexpected("Error adding comment"))
        }
        Err(err) => Err(err),
    }
}

async fn run_login(app: &AppContext, args: config::LoginArgs) -> Result<(), AppError> {
    let password = args.password.ok_or_else(|| {
        AppError::validation("a password is required (use --password or WAYFARE_PASSWORD)")
    })?;
    let session = app.session.login(&args.email, &password).await?;
    println!("Signed in as {}", session.display_identity());
    Ok(())
}

async fn run_logout(app: &AppContext) -> Result<(), AppError> {
    app.session.logout().await?;
    println!("Signed out.");
    Ok(())
}

async fn run_whoami(app: &AppContext, args: config::WhoamiArgs) -> Result<(), AppError> {
    let session = if args.remote {
        app.session.refresh().await?
    } else {
        app.session.restore()
    };
    println!(
        "👤 {} (theme: {})",
        session.display_identity(),
        session.theme.as_str()
    );
    Ok(())
}

fn run_theme(app: &AppContext, args: config::ThemeArgs) -> Result<(), AppError> {
    let next = app.session.set_theme(args.theme.map(Theme::from))?;
    println!("Theme set to {}", next.as_str());
    Ok(())
}
