//! Commands of the `Profile` entry point.

use specpub_model::{EntryPoint, ProfileDefn, ProfileKind};
use specpub_template::directive::escape_delimiters;
use specpub_template::{Directive, ResolveError, ResolverRegistry, Scope};

use crate::html::{escape_text, link, resource_file};

const PROFILE: &[EntryPoint] = &[EntryPoint::Profile];

pub(crate) fn register(registry: &mut ResolverRegistry) {
    registry.register("profile-title", PROFILE, "Profile title", title);
    registry.register("profile-url", PROFILE, "Canonical URL", url);
    registry.register("profile-desc", PROFILE, "Profile description", description);
    registry.register("profile-base", PROFILE, "Link to the constrained type", base);
    registry.register("ext-context", PROFILE, "Where an extension may be used", context);
}

/// The page's profile or extension.
fn current<'s>(directive: &Directive, scope: &Scope<'s>) -> Result<&'s ProfileDefn, ResolveError> {
    let id = scope
        .page
        .current_profile
        .as_deref()
        .ok_or_else(|| ResolveError::WrongContext {
            command: directive.command.clone(),
            needs: "a current profile",
        })?;
    let spec = scope.spec();
    spec.profile(id)
        .or_else(|| spec.extension(id))
        .ok_or_else(|| ResolveError::NotFound {
            kind: "profile",
            name: id.to_owned(),
        })
}

fn title(directive: &Directive, scope: &mut Scope<'_>) -> Result<String, ResolveError> {
    Ok(escape_text(&current(directive, scope)?.title))
}

fn url(directive: &Directive, scope: &mut Scope<'_>) -> Result<String, ResolveError> {
    let profile = current(directive, scope)?;
    Ok(format!("<code>{}</code>", escape_text(&profile.url)))
}

fn description(directive: &Directive, scope: &mut Scope<'_>) -> Result<String, ResolveError> {
    let profile = current(directive, scope)?;
    match scope.markdown().render(&profile.description) {
        Ok(html) => Ok(escape_delimiters(&html)),
        Err(err) => Ok(scope.unavailable(&format!("description of {}", profile.id), &err)),
    }
}

/// Link to the base resource page, or the base name when it is not a resource.
fn base(directive: &Directive, scope: &mut Scope<'_>) -> Result<String, ResolveError> {
    let profile = current(directive, scope)?;
    if scope.spec().resource(&profile.base).is_some() {
        let href = format!("{}{}", scope.page.root_prefix(), resource_file(&profile.base));
        return Ok(link(&href, &profile.base));
    }
    Ok(escape_text(&profile.base))
}

fn context(directive: &Directive, scope: &mut Scope<'_>) -> Result<String, ResolveError> {
    let profile = current(directive, scope)?;
    if profile.kind != ProfileKind::Extension {
        return Err(ResolveError::Invalid {
            command: directive.command.clone(),
            message: format!("`{}` is a profile, not an extension", profile.id),
        });
    }
    let items: String = profile
        .context
        .iter()
        .map(|c| format!("<li><code>{}</code></li>", escape_text(c)))
        .collect();
    Ok(format!("<ul class=\"ext-context\">{items}</ul>"))
}
