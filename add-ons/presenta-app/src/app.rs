//! Application shell: session flags + journey state in, one routed
//! screen out, every frame.
//!
//! All network work runs on the background runtime; one pending
//! receiver per logical action doubles as its in-flight guard, so a
//! second submit while one is outstanding is simply ignored.

use crate::export;
use crate::tasks::{poll, Background};
use eframe::egui;
use presenta_client::{
    spawn_refresh_scheduler, AgentForm, AnalysisSummary, ApiClient, ApiError, ApiResult,
    BillingInfo, BootOutcome, CardDetails, PaymentError, ProfileSnapshot, SavedAnalysis,
    ShareRequest, ShareStats, SharedAnalysis,
};
use presenta_core::{
    packages, route, AgentRecord, AppConfig, AppEvent, EventBus, JourneyState, Notifications,
    PackageTier, Presentation, RouteInputs, Screen,
};
use std::sync::mpsc::Receiver;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;

#[derive(PartialEq, Eq)]
enum AuthMode {
    Login,
    Signup,
}

/// `--shared <id>` mode: a public presentation, no session.
struct SharedViewer {
    share_id: String,
    pending: Option<Receiver<ApiResult<SharedAnalysis>>>,
    result: Option<Result<SharedAnalysis, String>>,
}

pub struct PresentaApp {
    client: Arc<ApiClient>,
    config: AppConfig,
    background: Background,
    bus: EventBus,
    events: Receiver<AppEvent>,
    toasts: Notifications,

    authenticated: bool,
    user: Option<AgentRecord>,
    profile_complete: bool,
    journey: JourneyState,
    refresh_task: Option<JoinHandle<()>>,

    // Auth screen.
    auth_mode: AuthMode,
    auth_email: String,
    auth_password: String,
    signup_form: AgentForm,
    auth_error: Option<String>,
    login_pending: Option<Receiver<ApiResult<ProfileSnapshot>>>,
    signup_pending: Option<Receiver<ApiResult<()>>>,

    // Address screen + recent panel.
    address_input: String,
    recent: Vec<AnalysisSummary>,
    recent_loaded: bool,
    recent_pending: Option<Receiver<ApiResult<Vec<AnalysisSummary>>>>,
    open_pending: Option<Receiver<ApiResult<SavedAnalysis>>>,
    delete_pending: Option<Receiver<(i64, ApiResult<()>)>>,

    // Profile completion / editor.
    profile_form: AgentForm,
    profile_error: Option<String>,
    profile_pending: Option<Receiver<ApiResult<ProfileSnapshot>>>,
    show_profile_editor: bool,

    // Checkout.
    billing_name: String,
    billing_email: String,
    billing_postal: String,
    card_number: String,
    card_exp_month: String,
    card_exp_year: String,
    card_cvc: String,
    payment_error: Option<String>,
    payment_pending: Option<Receiver<ApiResult<()>>>,

    // Generation + preview.
    generation_pending: Option<Receiver<ApiResult<Presentation>>>,
    generation_error: Option<String>,
    edit_buffer: Option<String>,
    content_save_pending: Option<Receiver<ApiResult<()>>>,

    // Share dialog.
    share_open: bool,
    share_link_url: String,
    share_email: String,
    share_message: String,
    share_pending: Option<Receiver<ApiResult<Option<i64>>>>,
    share_stats: Option<ShareStats>,
    share_stats_pending: Option<Receiver<ApiResult<ShareStats>>>,

    shared_view: Option<SharedViewer>,
}

fn form_from_record(user: &AgentRecord) -> AgentForm {
    let field = |v: &Option<String>| v.clone().unwrap_or_default();
    AgentForm {
        email: field(&user.email),
        password: None,
        first_name: field(&user.first_name),
        last_name: field(&user.last_name),
        phone: field(&user.phone),
        company_name: field(&user.company_name),
        license_number: field(&user.license_number),
        years_experience: field(&user.years_experience),
        awards: field(&user.awards),
        specialty: field(&user.specialty),
        shortest_sale: field(&user.shortest_sale),
        highest_sale: field(&user.highest_sale),
        avg_days_on_market: field(&user.avg_days_on_market),
        mission: field(&user.mission),
        value_proposition: field(&user.value_proposition),
        selling_style: field(&user.selling_style),
        testimonial_1: field(&user.testimonial_1),
        testimonial_2: field(&user.testimonial_2),
        testimonial_3: field(&user.testimonial_3),
        community_ties: field(&user.community_ties),
        headshot: None,
        logo: None,
    }
}

impl PresentaApp {
    pub fn new(
        client: Arc<ApiClient>,
        config: AppConfig,
        background: Background,
        boot: BootOutcome,
        shared_id: Option<String>,
    ) -> Self {
        let bus = EventBus::new();
        let events = bus.subscribe();
        let mut app = Self {
            client,
            config,
            background,
            bus,
            events,
            toasts: Notifications::new(),
            authenticated: false,
            user: None,
            profile_complete: false,
            journey: JourneyState::default(),
            refresh_task: None,
            auth_mode: AuthMode::Login,
            auth_email: String::new(),
            auth_password: String::new(),
            signup_form: AgentForm::default(),
            auth_error: None,
            login_pending: None,
            signup_pending: None,
            address_input: String::new(),
            recent: Vec::new(),
            recent_loaded: false,
            recent_pending: None,
            open_pending: None,
            delete_pending: None,
            profile_form: AgentForm::default(),
            profile_error: None,
            profile_pending: None,
            show_profile_editor: false,
            billing_name: String::new(),
            billing_email: String::new(),
            billing_postal: String::new(),
            card_number: String::new(),
            card_exp_month: String::new(),
            card_exp_year: String::new(),
            card_cvc: String::new(),
            payment_error: None,
            payment_pending: None,
            generation_pending: None,
            generation_error: None,
            edit_buffer: None,
            content_save_pending: None,
            share_open: false,
            share_link_url: String::new(),
            share_email: String::new(),
            share_message: String::new(),
            share_pending: None,
            share_stats: None,
            share_stats_pending: None,
            shared_view: None,
        };

        if let BootOutcome::Ready {
            user,
            profile_complete,
        } = boot
        {
            app.profile_form = form_from_record(&user);
            app.user = Some(user);
            app.profile_complete = profile_complete;
            app.authenticated = true;
            app.start_refresh_scheduler();
        }

        if let Some(share_id) = shared_id {
            let client = Arc::clone(&app.client);
            let id = share_id.clone();
            let pending = app
                .background
                .run(async move { client.fetch_shared(&id).await });
            app.shared_view = Some(SharedViewer {
                share_id,
                pending: Some(pending),
                result: None,
            });
        }
        app
    }

    // ----- session lifecycle -------------------------------------------------

    fn start_refresh_scheduler(&mut self) {
        if self.refresh_task.is_some() {
            return;
        }
        let every = Duration::from_secs(self.config.refresh_interval_hours.max(1) * 3600);
        let lead = chrono::Duration::minutes(self.config.refresh_lead_minutes as i64);
        let _guard = self.background.enter();
        self.refresh_task = Some(spawn_refresh_scheduler(
            Arc::clone(&self.client),
            every,
            lead,
        ));
    }

    fn stop_refresh_scheduler(&mut self) {
        if let Some(task) = self.refresh_task.take() {
            task.abort();
        }
    }

    fn on_session_cleared(&mut self) {
        self.stop_refresh_scheduler();
        self.authenticated = false;
        self.user = None;
        self.profile_complete = false;
        self.journey.reset();
        self.recent.clear();
        self.recent_loaded = false;
        self.show_profile_editor = false;
        self.share_open = false;
    }

    fn logout(&mut self) {
        if let Err(err) = self.client.logout() {
            tracing::error!(error = %err, "logout could not clear the store");
        }
        self.on_session_cleared();
        self.bus.publish(AppEvent::SessionCleared);
    }

    /// Converts an error into a user-facing message, handling session
    /// expiry as a side effect. Every failure path lands somewhere
    /// visible, never a blank screen.
    fn describe_error(&mut self, err: &ApiError) -> String {
        if matches!(err, ApiError::SessionExpired) {
            self.on_session_cleared();
            self.bus.publish(AppEvent::SessionCleared);
        }
        match err {
            ApiError::Network(_) => "Network problem. Please try again.".to_string(),
            other => other.to_string(),
        }
    }

    // ----- action starters ---------------------------------------------------

    fn submit_login(&mut self) {
        if self.login_pending.is_some() {
            return;
        }
        self.auth_error = None;
        let client = Arc::clone(&self.client);
        let email = self.auth_email.trim().to_string();
        let password = self.auth_password.clone();
        self.login_pending = Some(
            self.background
                .run(async move { client.login(&email, &password).await }),
        );
    }

    fn submit_signup(&mut self) {
        if self.signup_pending.is_some() {
            return;
        }
        self.auth_error = None;
        let mut form = self.signup_form.clone();
        form.password = Some(self.auth_password.clone());
        if form.email.trim().is_empty() || self.auth_password.is_empty() {
            self.auth_error = Some("Email and password are required.".into());
            return;
        }
        let client = Arc::clone(&self.client);
        self.signup_pending = Some(
            self.background
                .run(async move { client.register(&form).await }),
        );
    }

    fn submit_address(&mut self) {
        let address = self.address_input.trim().to_string();
        if address.is_empty() {
            return;
        }
        self.journey.submit_address(&address);
        if let Err(err) = self.client.store().record_search(&address) {
            tracing::warn!(error = %err, "could not record recent search");
        }
        self.address_input.clear();
    }

    fn load_recent(&mut self) {
        if self.recent_pending.is_some() {
            return;
        }
        let client = Arc::clone(&self.client);
        self.recent_pending = Some(
            self.background
                .run(async move { client.recent_analyses().await }),
        );
    }

    fn open_analysis(&mut self, id: i64) {
        if self.open_pending.is_some() {
            return;
        }
        let client = Arc::clone(&self.client);
        self.open_pending = Some(
            self.background
                .run(async move { client.get_analysis(id).await }),
        );
    }

    fn delete_analysis(&mut self, id: i64) {
        if self.delete_pending.is_some() {
            return;
        }
        let client = Arc::clone(&self.client);
        self.delete_pending = Some(
            self.background
                .run(async move { (id, client.delete_analysis(id).await) }),
        );
    }

    fn save_profile(&mut self) {
        if self.profile_pending.is_some() {
            return;
        }
        self.profile_error = None;
        let client = Arc::clone(&self.client);
        let form = self.profile_form.clone();
        self.profile_pending = Some(
            self.background
                .run(async move { client.update_profile(&form).await }),
        );
    }

    /// "Skip for now": the gate opens for this session only; the real
    /// completeness is recomputed from the backend on the next start.
    fn skip_profile(&mut self) {
        self.profile_complete = true;
        if let Err(err) = self.client.store().set_profile_complete(true) {
            tracing::warn!(error = %err, "could not persist skip flag");
        }
    }

    fn select_package(&mut self, tier: &'static PackageTier) {
        if tier.requires_sales_contact() {
            self.toasts
                .push("Enterprise is arranged through sales. We'll be in touch.",
                    presenta_core::Severity::Info,
                    presenta_core::DEFAULT_TOAST_DURATION,
                );
            return;
        }
        self.journey.select_package(tier);
        self.payment_error = None;
    }

    fn submit_payment(&mut self) {
        if self.payment_pending.is_some() {
            return;
        }
        self.payment_error = None;
        let Some(tier) = self.journey.selected_package else {
            return;
        };
        let Some(address) = self.journey.address.clone() else {
            return;
        };
        let (Ok(exp_month), Ok(exp_year)) = (
            self.card_exp_month.trim().parse::<u8>(),
            self.card_exp_year.trim().parse::<u16>(),
        ) else {
            self.payment_error = Some("Card expiry must be numeric (MM and YYYY).".into());
            return;
        };
        if self.card_number.trim().is_empty() || self.card_cvc.trim().is_empty() {
            self.payment_error = Some("Card number and CVC are required.".into());
            return;
        }
        let billing = BillingInfo {
            name: self.billing_name.trim().to_string(),
            email: self.billing_email.trim().to_string(),
            postal_code: self.billing_postal.trim().to_string(),
        };
        let card = CardDetails {
            number: self.card_number.trim().replace(' ', ""),
            exp_month,
            exp_year,
            cvc: self.card_cvc.trim().to_string(),
        };
        let client = Arc::clone(&self.client);
        self.payment_pending = Some(self.background.run(async move {
            let secret = client
                .create_payment_intent(tier, &address, &billing)
                .await?;
            client.confirm_card_payment(&secret, &card, &billing).await?;
            Ok(())
        }));
    }

    fn start_generation(&mut self) {
        if self.generation_pending.is_some() {
            return;
        }
        self.generation_error = None;
        let Some(address) = self.journey.address.clone() else {
            return;
        };
        let package_name = self
            .journey
            .selected_package
            .map(|t| t.name.to_string())
            .unwrap_or_default();
        let client = Arc::clone(&self.client);
        self.generation_pending = Some(self.background.run(async move {
            let mut presentation = client.generate_presentation(&address).await?;
            // A failed save is a warning, not a lost presentation.
            match client.save_analysis(&presentation, &package_name).await {
                Ok(id) => presentation.analysis_id = Some(id),
                Err(err) => {
                    tracing::warn!(error = %err, "analysis save failed; presentation kept in memory")
                }
            }
            Ok(presentation)
        }));
    }

    fn save_edited_content(&mut self) {
        if self.content_save_pending.is_some() {
            return;
        }
        let Some(buffer) = self.edit_buffer.take() else {
            return;
        };
        let Some(presentation) = self.journey.presentation.as_mut() else {
            return;
        };
        presentation.content = buffer;
        let Some(id) = presentation.analysis_id else {
            self.toasts.warning("Edited locally. This presentation was never saved to your account.");
            return;
        };
        let content = presentation.content.clone();
        let client = Arc::clone(&self.client);
        self.content_save_pending = Some(
            self.background
                .run(async move { client.update_analysis(id, &content).await }),
        );
    }

    fn export_presentation(&mut self) {
        let Some(presentation) = self.journey.presentation.as_ref() else {
            return;
        };
        match export::export_presentation(
            std::path::Path::new(&self.config.export_dir),
            presentation,
            self.config.pdf_command.as_deref(),
        ) {
            Ok(path) => self
                .toasts
                .success(format!("Exported to {}", path.display())),
            Err(err) => self.toasts.error(format!("Export failed: {err}")),
        }
    }

    fn open_share_dialog(&mut self) {
        let Some(presentation) = self.journey.presentation.as_ref() else {
            return;
        };
        self.share_open = true;
        self.share_link_url = presenta_client::share_link(
            &self.config.share_base_url,
            &presenta_client::new_share_id(),
        );
        self.share_message = format!(
            "Hi! I'd like to share this property analysis for {} with you.",
            presentation.address
        );
        self.load_share_stats();
    }

    fn load_share_stats(&mut self) {
        if self.share_stats_pending.is_some() {
            return;
        }
        let Some(address) = self
            .journey
            .presentation
            .as_ref()
            .map(|p| p.address.clone())
        else {
            return;
        };
        let client = Arc::clone(&self.client);
        self.share_stats_pending = Some(
            self.background
                .run(async move { client.share_stats(&address).await }),
        );
    }

    fn copy_share_link(&mut self, ctx: &egui::Context) {
        if self.share_pending.is_some() {
            return;
        }
        let Some(presentation) = self.journey.presentation.as_ref() else {
            return;
        };
        ctx.copy_text(self.share_link_url.clone());
        let shared_by = self
            .user
            .as_ref()
            .map(AgentRecord::display_name)
            .unwrap_or_else(|| "Unknown agent".to_string());
        let client = Arc::clone(&self.client);
        let presentation = presentation.clone();
        let link = self.share_link_url.clone();
        self.share_pending = Some(self.background.run(async move {
            client
                .record_link_share(&presentation, &link, &shared_by)
                .await
        }));
        self.toasts.success("Link copied to clipboard");
    }

    fn send_email_share(&mut self) {
        if self.share_pending.is_some() {
            return;
        }
        let email = self.share_email.trim().to_string();
        if email.is_empty() {
            return;
        }
        let Some(presentation) = self.journey.presentation.as_ref() else {
            return;
        };
        let shared_by = self
            .user
            .as_ref()
            .map(AgentRecord::display_name)
            .unwrap_or_else(|| "Unknown agent".to_string());
        let request = ShareRequest {
            email,
            property_address: presentation.address.clone(),
            analysis_content: presentation.content.clone(),
            share_message: self.share_message.trim().to_string(),
            share_link: self.share_link_url.clone(),
            shared_by,
        };
        let client = Arc::clone(&self.client);
        self.share_pending = Some(
            self.background
                .run(async move { client.share_analysis(&request).await }),
        );
    }

    fn start_over(&mut self) {
        self.journey.reset();
        self.generation_error = None;
        self.edit_buffer = None;
        self.share_open = false;
        self.recent_loaded = false;
        self.bus.publish(AppEvent::JourneyReset);
    }

    // ----- frame plumbing ----------------------------------------------------

    fn drain_results(&mut self) {
        if let Some(result) = poll(&mut self.login_pending) {
            match result {
                Ok(snapshot) => {
                    self.profile_form = form_from_record(&snapshot.user);
                    self.user = Some(snapshot.user);
                    self.profile_complete = snapshot.complete;
                    self.authenticated = true;
                    self.auth_password.clear();
                    self.start_refresh_scheduler();
                    self.toasts.success("Welcome back!");
                }
                Err(err) => self.auth_error = Some(self.describe_error(&err)),
            }
        }

        if let Some(result) = poll(&mut self.signup_pending) {
            match result {
                Ok(()) => {
                    self.auth_mode = AuthMode::Login;
                    self.toasts.success("Account created. Log in to continue.");
                }
                Err(err) => self.auth_error = Some(self.describe_error(&err)),
            }
        }

        if let Some(result) = poll(&mut self.recent_pending) {
            self.recent_loaded = true;
            match result {
                Ok(rows) => self.recent = rows,
                Err(err) => {
                    let message = self.describe_error(&err);
                    tracing::warn!(message, "recent analyses unavailable");
                }
            }
        }

        if let Some(result) = poll(&mut self.open_pending) {
            match result {
                Ok(analysis) => self
                    .bus
                    .publish(AppEvent::ShowPresentation(analysis.into_presentation())),
                Err(err) => {
                    let message = self.describe_error(&err);
                    self.toasts.error(message);
                }
            }
        }

        if let Some((id, result)) = poll(&mut self.delete_pending) {
            match result {
                Ok(()) => {
                    self.recent.retain(|row| row.id != id);
                    self.toasts.success("Analysis deleted");
                }
                Err(err) => {
                    let message = self.describe_error(&err);
                    self.toasts.error(message);
                }
            }
        }

        if let Some(result) = poll(&mut self.profile_pending) {
            match result {
                Ok(ProfileSnapshot { user, complete }) => {
                    self.profile_form = form_from_record(&user);
                    self.user = Some(user);
                    self.profile_complete = complete;
                    self.show_profile_editor = false;
                    self.bus.publish(AppEvent::ProfileUpdated { complete });
                    self.toasts.success("Profile saved");
                }
                Err(err) => self.profile_error = Some(self.describe_error(&err)),
            }
        }

        if let Some(result) = poll(&mut self.payment_pending) {
            match result {
                Ok(()) => {
                    self.journey.complete_payment();
                    self.toasts.success("Payment accepted");
                    self.start_generation();
                }
                Err(err) => {
                    self.payment_error = Some(match &err {
                        ApiError::Payment(PaymentError::Unavailable) => err.to_string(),
                        ApiError::Payment(inner) => inner.to_string(),
                        other => self.describe_error(other),
                    });
                }
            }
        }

        if let Some(result) = poll(&mut self.generation_pending) {
            match result {
                Ok(presentation) => {
                    self.journey.show_presentation(presentation);
                    self.recent_loaded = false;
                }
                Err(err) => {
                    self.generation_error = Some(self.describe_error(&err));
                }
            }
        }

        if let Some(result) = poll(&mut self.content_save_pending) {
            match result {
                Ok(()) => self.toasts.success("Changes saved"),
                Err(err) => {
                    let message = self.describe_error(&err);
                    self.toasts.error(message);
                }
            }
        }

        if let Some(result) = poll(&mut self.share_pending) {
            match result {
                Ok(_) => {
                    self.toasts.success("Analysis shared");
                    self.share_stats = None;
                    self.load_share_stats();
                }
                Err(err) => {
                    let message = self.describe_error(&err);
                    self.toasts.error(message);
                }
            }
        }

        if let Some(result) = poll(&mut self.share_stats_pending) {
            match result {
                Ok(stats) => self.share_stats = Some(stats),
                Err(err) => tracing::warn!(error = %err, "share stats unavailable"),
            }
        }

        if let Some(viewer) = self.shared_view.as_mut() {
            if let Some(result) = poll(&mut viewer.pending) {
                viewer.result = Some(result.map_err(|err| err.to_string()));
            }
        }
    }

    fn drain_events(&mut self) {
        while let Ok(event) = self.events.try_recv() {
            match event {
                AppEvent::ShowPresentation(presentation) => {
                    self.edit_buffer = None;
                    self.journey.show_presentation(presentation);
                }
                AppEvent::SessionCleared => self.on_session_cleared(),
                AppEvent::ProfileUpdated { complete } => self.profile_complete = complete,
                AppEvent::JourneyReset => self.recent_loaded = false,
            }
        }
    }

    // ----- rendering ---------------------------------------------------------

    fn navbar(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("presenta_navbar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.heading("Presenta");
                ui.label(egui::RichText::new("AI listing presentations").weak());
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if self.authenticated {
                        if ui.button("Log out").clicked() {
                            self.logout();
                        }
                        if ui.button("Profile").clicked() {
                            if let Some(user) = &self.user {
                                self.profile_form = form_from_record(user);
                            }
                            self.profile_error = None;
                            self.show_profile_editor = true;
                        }
                        if let Some(user) = &self.user {
                            ui.label(egui::RichText::new(user.display_name()).weak());
                        }
                    }
                    let in_funnel = self.journey.address.is_some()
                        || self.journey.presentation.is_some();
                    if self.authenticated && in_funnel && ui.button("← Start over").clicked() {
                        self.start_over();
                    }
                });
            });
        });
    }

    fn toast_panel(&mut self, ctx: &egui::Context) {
        if self.toasts.is_empty() {
            return;
        }
        egui::TopBottomPanel::bottom("presenta_toasts").show(ctx, |ui| {
            for toast in self.toasts.visible() {
                let color = match toast.severity {
                    presenta_core::Severity::Success => egui::Color32::DARK_GREEN,
                    presenta_core::Severity::Info => egui::Color32::GRAY,
                    presenta_core::Severity::Warning => egui::Color32::from_rgb(181, 137, 0),
                    presenta_core::Severity::Error => egui::Color32::RED,
                };
                ui.label(egui::RichText::new(&toast.message).color(color));
            }
        });
    }

    fn auth_screen(&mut self, ui: &mut egui::Ui) {
        ui.vertical_centered(|ui| {
            ui.add_space(40.0);
            ui.heading("Sign in to Presenta");
            ui.add_space(8.0);
            ui.horizontal(|ui| {
                ui.selectable_value(&mut self.auth_mode, AuthMode::Login, "Log in");
                ui.selectable_value(&mut self.auth_mode, AuthMode::Signup, "Sign up");
            });
            ui.add_space(12.0);

            match self.auth_mode {
                AuthMode::Login => {
                    ui.label("Email");
                    ui.text_edit_singleline(&mut self.auth_email);
                    ui.label("Password");
                    ui.add(egui::TextEdit::singleline(&mut self.auth_password).password(true));
                }
                AuthMode::Signup => {
                    ui.label("Email");
                    ui.text_edit_singleline(&mut self.signup_form.email);
                    ui.label("Password");
                    ui.add(egui::TextEdit::singleline(&mut self.auth_password).password(true));
                    ui.label("First name");
                    ui.text_edit_singleline(&mut self.signup_form.first_name);
                    ui.label("Last name");
                    ui.text_edit_singleline(&mut self.signup_form.last_name);
                    ui.label("Company");
                    ui.text_edit_singleline(&mut self.signup_form.company_name);
                }
            }

            if let Some(error) = &self.auth_error {
                ui.colored_label(egui::Color32::RED, error);
            }

            ui.add_space(8.0);
            let pending = self.login_pending.is_some() || self.signup_pending.is_some();
            if pending {
                ui.spinner();
            }
            let label = match self.auth_mode {
                AuthMode::Login => "Log in",
                AuthMode::Signup => "Create account",
            };
            if ui.add_enabled(!pending, egui::Button::new(label)).clicked() {
                match self.auth_mode {
                    AuthMode::Login => self.submit_login(),
                    AuthMode::Signup => self.submit_signup(),
                }
            }
        });
    }

    fn address_screen(&mut self, ctx: &egui::Context) {
        if !self.recent_loaded && self.recent_pending.is_none() {
            self.load_recent();
        }

        egui::SidePanel::right("recent_analyses")
            .default_width(300.0)
            .show(ctx, |ui| {
                ui.heading("Recent presentations");
                if self.recent_pending.is_some() {
                    ui.spinner();
                }
                if self.recent.is_empty() && self.recent_pending.is_none() {
                    ui.label(egui::RichText::new("Nothing generated yet.").weak());
                }
                let mut to_open = None;
                let mut to_delete = None;
                egui::ScrollArea::vertical().show(ui, |ui| {
                    for row in &self.recent {
                        ui.group(|ui| {
                            ui.label(&row.address);
                            if let Some(package) = &row.package_name {
                                ui.label(egui::RichText::new(package).small().weak());
                            }
                            ui.horizontal(|ui| {
                                if ui.small_button("View").clicked() {
                                    to_open = Some(row.id);
                                }
                                if ui.small_button("Delete").clicked() {
                                    to_delete = Some(row.id);
                                }
                            });
                        });
                    }
                });
                if let Some(id) = to_open {
                    self.open_analysis(id);
                }
                if let Some(id) = to_delete {
                    self.delete_analysis(id);
                }
            });

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.add_space(40.0);
            ui.vertical_centered(|ui| {
                ui.heading("Which property are we presenting?");
                ui.add_space(12.0);
                let response = ui.add(
                    egui::TextEdit::singleline(&mut self.address_input)
                        .hint_text("Street, city, state")
                        .desired_width(420.0),
                );
                let submitted =
                    response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
                if ui.button("Continue").clicked() || submitted {
                    self.submit_address();
                }
            });
        });
    }

    fn profile_form_ui(&mut self, ui: &mut egui::Ui) {
        egui::ScrollArea::vertical().show(ui, |ui| {
            ui.label("First name");
            ui.text_edit_singleline(&mut self.profile_form.first_name);
            ui.label("Last name");
            ui.text_edit_singleline(&mut self.profile_form.last_name);
            ui.label("Email");
            ui.text_edit_singleline(&mut self.profile_form.email);
            ui.label("Company");
            ui.text_edit_singleline(&mut self.profile_form.company_name);
            ui.label("Phone");
            ui.text_edit_singleline(&mut self.profile_form.phone);
            ui.separator();
            ui.label(egui::RichText::new(
                "At least one performance stat is required to finish your profile.",
            ).weak());
            ui.label("Shortest sale");
            ui.text_edit_singleline(&mut self.profile_form.shortest_sale);
            ui.label("Highest sale");
            ui.text_edit_singleline(&mut self.profile_form.highest_sale);
            ui.label("Average days on market");
            ui.text_edit_singleline(&mut self.profile_form.avg_days_on_market);
            ui.separator();
            ui.label("Mission");
            ui.text_edit_multiline(&mut self.profile_form.mission);
            ui.label("Value proposition");
            ui.text_edit_multiline(&mut self.profile_form.value_proposition);
            ui.label("Community ties");
            ui.text_edit_multiline(&mut self.profile_form.community_ties);
        });

        if let Some(error) = &self.profile_error {
            ui.colored_label(egui::Color32::RED, error);
        }
        ui.horizontal(|ui| {
            let pending = self.profile_pending.is_some();
            if pending {
                ui.spinner();
            }
            if ui
                .add_enabled(!pending, egui::Button::new("Save profile"))
                .clicked()
            {
                self.save_profile();
            }
        });
    }

    fn profile_screen(&mut self, ui: &mut egui::Ui) {
        ui.heading("Complete your agent profile");
        ui.label(
            egui::RichText::new(
                "Your presentation is branded with this profile. You can skip for now and \
                 finish it later.",
            )
            .weak(),
        );
        ui.add_space(8.0);
        self.profile_form_ui(ui);
        if ui.button("Skip for now").clicked() {
            self.skip_profile();
        }
    }

    fn packages_screen(&mut self, ui: &mut egui::Ui) {
        ui.heading("Pick a package");
        ui.add_space(8.0);
        let selected_id = self.journey.selected_package.map(|t| t.id);
        let mut clicked: Option<&'static PackageTier> = None;
        ui.columns(packages::CATALOG.len(), |columns| {
            for (column, tier) in columns.iter_mut().zip(packages::CATALOG.iter()) {
                column.group(|ui| {
                    ui.vertical(|ui| {
                        ui.label(egui::RichText::new(tier.name).strong());
                        if tier.popular {
                            ui.label(egui::RichText::new("Most popular").small().weak());
                        }
                        match tier.price {
                            Some(price) => ui.label(format!(
                                "${price}{}",
                                match tier.billing {
                                    presenta_core::Billing::Monthly => "/mo",
                                    _ => "",
                                }
                            )),
                            None => ui.label("Custom pricing"),
                        };
                        ui.label(egui::RichText::new(tier.description).small());
                        for feature in tier.features {
                            ui.label(egui::RichText::new(format!("• {feature}")).small());
                        }
                        let label = if selected_id == Some(tier.id) {
                            "Selected"
                        } else if tier.requires_sales_contact() {
                            "Contact sales"
                        } else {
                            "Select"
                        };
                        if ui.button(label).clicked() {
                            clicked = Some(tier);
                        }
                    });
                });
            }
        });
        if let Some(tier) = clicked {
            self.select_package(tier);
        }

        if let Some(tier) = self.journey.selected_package {
            ui.separator();
            ui.heading(format!("Checkout: {}", tier.name));
            ui.label("Name on card");
            ui.text_edit_singleline(&mut self.billing_name);
            ui.label("Billing email");
            ui.text_edit_singleline(&mut self.billing_email);
            ui.horizontal(|ui| {
                ui.vertical(|ui| {
                    ui.label("Card number");
                    ui.text_edit_singleline(&mut self.card_number);
                });
                ui.vertical(|ui| {
                    ui.label("MM");
                    ui.add(
                        egui::TextEdit::singleline(&mut self.card_exp_month).desired_width(40.0),
                    );
                });
                ui.vertical(|ui| {
                    ui.label("YYYY");
                    ui.add(egui::TextEdit::singleline(&mut self.card_exp_year).desired_width(60.0));
                });
                ui.vertical(|ui| {
                    ui.label("CVC");
                    ui.add(egui::TextEdit::singleline(&mut self.card_cvc).desired_width(50.0));
                });
                ui.vertical(|ui| {
                    ui.label("Postal code");
                    ui.add(egui::TextEdit::singleline(&mut self.billing_postal).desired_width(80.0));
                });
            });
            if let Some(error) = &self.payment_error {
                ui.colored_label(egui::Color32::RED, error);
            }
            let pending = self.payment_pending.is_some();
            ui.horizontal(|ui| {
                if pending {
                    ui.spinner();
                    ui.label("Processing payment…");
                }
                let pay_label = tier
                    .price
                    .map(|p| format!("Pay ${p}"))
                    .unwrap_or_else(|| "Pay".to_string());
                if ui
                    .add_enabled(!pending, egui::Button::new(pay_label))
                    .clicked()
                {
                    self.submit_payment();
                }
            });
        }
    }

    fn preview_screen(&mut self, ctx: &egui::Context, ui: &mut egui::Ui) {
        if self.generation_pending.is_some() {
            ui.vertical_centered(|ui| {
                ui.add_space(80.0);
                ui.spinner();
                ui.heading("Generating your presentation…");
                ui.label(
                    egui::RichText::new("Researching the market can take a minute.").weak(),
                );
            });
            return;
        }
        if let Some(error) = self.generation_error.clone() {
            ui.vertical_centered(|ui| {
                ui.add_space(80.0);
                ui.colored_label(egui::Color32::RED, &error);
                if ui.button("Try again").clicked() {
                    self.start_generation();
                }
            });
            return;
        }
        let Some(presentation) = self.journey.presentation.clone() else {
            // Payment done but generation never started (e.g. restored
            // journey): kick it off rather than showing a dead end.
            self.start_generation();
            return;
        };

        ui.horizontal(|ui| {
            ui.heading(&presentation.address);
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui.button("Share").clicked() {
                    self.open_share_dialog();
                }
                if ui.button("Export").clicked() {
                    self.export_presentation();
                }
                match &self.edit_buffer {
                    Some(_) => {
                        let pending = self.content_save_pending.is_some();
                        if pending {
                            ui.spinner();
                        }
                        if ui.add_enabled(!pending, egui::Button::new("Save")).clicked() {
                            self.save_edited_content();
                        }
                        if ui.button("Discard").clicked() {
                            self.edit_buffer = None;
                        }
                    }
                    None => {
                        if ui.button("Edit").clicked() {
                            self.edit_buffer = Some(presentation.content.clone());
                        }
                    }
                }
            });
        });
        ui.label(
            egui::RichText::new(format!("Generated by {}", presentation.model))
                .small()
                .weak(),
        );
        ui.separator();

        egui::ScrollArea::vertical().show(ui, |ui| match self.edit_buffer.as_mut() {
            Some(buffer) => {
                ui.add(
                    egui::TextEdit::multiline(buffer)
                        .font(egui::TextStyle::Monospace)
                        .desired_width(f32::INFINITY)
                        .desired_rows(30),
                );
            }
            None => {
                ui.label(presentation.content.as_str());
            }
        });

        self.share_window(ctx);
    }

    fn share_window(&mut self, ctx: &egui::Context) {
        if !self.share_open {
            return;
        }
        let mut open = self.share_open;
        egui::Window::new("Share presentation")
            .open(&mut open)
            .resizable(false)
            .show(ctx, |ui| {
                ui.label("Anyone with the link can view this presentation:");
                ui.horizontal(|ui| {
                    ui.monospace(&self.share_link_url);
                    if ui.button("Copy").clicked() {
                        self.copy_share_link(ctx);
                    }
                });
                ui.separator();
                ui.label("Send by email");
                ui.text_edit_singleline(&mut self.share_email);
                ui.text_edit_multiline(&mut self.share_message);
                let pending = self.share_pending.is_some();
                ui.horizontal(|ui| {
                    if pending {
                        ui.spinner();
                    }
                    if ui.add_enabled(!pending, egui::Button::new("Send")).clicked() {
                        self.send_email_share();
                    }
                });
                if let Some(stats) = &self.share_stats {
                    ui.separator();
                    ui.label(format!(
                        "{} shares · {} views",
                        stats.total_shares, stats.total_views
                    ));
                    for row in &stats.email_stats {
                        ui.label(
                            egui::RichText::new(format!(
                                "{} viewed {} times",
                                row.email, row.times_viewed
                            ))
                            .small()
                            .weak(),
                        );
                    }
                }
            });
        self.share_open = open;
    }

    fn profile_editor_window(&mut self, ctx: &egui::Context) {
        if !self.show_profile_editor {
            return;
        }
        let mut open = self.show_profile_editor;
        egui::Window::new("Edit profile")
            .open(&mut open)
            .default_width(520.0)
            .show(ctx, |ui| {
                self.profile_form_ui(ui);
            });
        if self.show_profile_editor {
            self.show_profile_editor = open;
        }
    }

    fn shared_viewer_screen(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default().show(ctx, |ui| {
            let Some(viewer) = self.shared_view.as_ref() else {
                return;
            };
            match &viewer.result {
                None => {
                    ui.vertical_centered(|ui| {
                        ui.add_space(80.0);
                        ui.spinner();
                        ui.label("Loading shared presentation…");
                    });
                }
                Some(Err(message)) => {
                    ui.vertical_centered(|ui| {
                        ui.add_space(80.0);
                        ui.heading("This link doesn't work anymore");
                        ui.colored_label(egui::Color32::RED, message);
                        ui.label(
                            egui::RichText::new(format!("share id: {}", viewer.share_id))
                                .small()
                                .weak(),
                        );
                    });
                }
                Some(Ok(shared)) => {
                    if let Some(address) = &shared.property_address {
                        ui.heading(address);
                    }
                    if let Some(by) = &shared.shared_by {
                        ui.label(egui::RichText::new(format!("Shared by {by}")).weak());
                    }
                    ui.separator();
                    egui::ScrollArea::vertical().show(ui, |ui| {
                        ui.label(shared.analysis_content.as_str());
                    });
                }
            }
        });
    }
}

impl eframe::App for PresentaApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Background results arrive between frames; keep polling.
        ctx.request_repaint_after(Duration::from_millis(200));

        self.drain_results();
        self.drain_events();
        self.toasts.expire(Instant::now());

        if self.shared_view.is_some() {
            self.shared_viewer_screen(ctx);
            self.toast_panel(ctx);
            return;
        }

        self.navbar(ctx);
        self.toast_panel(ctx);
        self.profile_editor_window(ctx);

        let screen = route(RouteInputs {
            authenticated: self.authenticated,
            profile_complete: self.profile_complete,
            journey: &self.journey,
        });

        match screen {
            Screen::Address => self.address_screen(ctx),
            Screen::Auth => {
                egui::CentralPanel::default().show(ctx, |ui| self.auth_screen(ui));
            }
            Screen::ProfileCompletion => {
                egui::CentralPanel::default().show(ctx, |ui| self.profile_screen(ui));
            }
            Screen::Packages => {
                egui::CentralPanel::default().show(ctx, |ui| self.packages_screen(ui));
            }
            Screen::Preview => {
                egui::CentralPanel::default().show(ctx, |ui| self.preview_screen(ctx, ui));
            }
        }
    }
}

impl Drop for PresentaApp {
    fn drop(&mut self) {
        // Shell teardown must not leak the refresh timer.
        self.stop_refresh_scheduler();
    }
}
