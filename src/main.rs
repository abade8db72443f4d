use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use vitae::{
    catalog::Catalog,
    configuration::ExportConfiguration,
    email::{CvEmail, EmailRequest},
    error::{ContextError, ErrorKind},
    export::Exporter,
    options::{Language, RenderOptions, Theme, Version},
};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct CliArguments {
    #[command(subcommand)]
    command: Command,
    #[arg(
        short = 'v',
        long = "verbose",
        action = clap::ArgAction::Count,
        global = true,
        help = "Increase the verbosity of the logs, can be repeated"
    )]
    verbosity: u8,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render the CV and save it into the output directory
    Download {
        #[command(flatten)]
        render: RenderArguments,
        #[arg(
            short = 'o',
            long = "output",
            value_name = "directory",
            default_value = "."
        )]
        output_directory: PathBuf,
    },
    /// Render the CV and print it as a base64 e-mail attachment in the JSON format
    Attachment {
        #[command(flatten)]
        render: RenderArguments,
        #[arg(
            long = "to",
            value_name = "email",
            help = "Print the whole e-mail payload for this recipient instead of the attachment alone"
        )]
        recipient_email: Option<String>,
        #[arg(long = "to-name", value_name = "name")]
        recipient_name: Option<String>,
        #[arg(long = "subject")]
        subject: Option<String>,
        #[arg(long = "message")]
        message: Option<String>,
    },
}

#[derive(Args, Debug)]
struct RenderArguments {
    #[arg(long = "options", value_name = "json_file", help = "Render options in the JSON format")]
    options_path: Option<PathBuf>,
    #[arg(long = "theme", help = "Either light or dark")]
    theme: Option<String>,
    #[arg(long = "language", help = "Either en or fr")]
    language: Option<String>,
    #[arg(long = "cv-version", value_name = "version", help = "Either full or short")]
    version: Option<String>,
    #[arg(long = "project", value_name = "identifier", help = "Select a project, can be repeated")]
    projects: Vec<String>,
    #[arg(long = "hide", value_enum, help = "Hide an optional section, can be repeated")]
    hidden_sections: Vec<OptionalSection>,
    #[arg(long = "data", value_name = "json_file", help = "Data store replacing the built-in one")]
    data_path: Option<PathBuf>,
    #[arg(long = "configuration", value_name = "json_file")]
    configuration_path: Option<PathBuf>,
}

#[derive(Debug, Copy, Clone, clap::ValueEnum)]
enum OptionalSection {
    Interests,
    Certifications,
    Extracurricular,
}

impl RenderArguments {
    fn configuration(&self) -> Result<ExportConfiguration, ContextError> {
        match &self.configuration_path {
            Some(configuration_path) => ExportConfiguration::from_path(configuration_path),
            None => Ok(ExportConfiguration::default()),
        }
    }

    fn catalog(&self, configuration: &ExportConfiguration) -> Result<Catalog, ContextError> {
        match self.data_path.as_ref().or(configuration.data_path.as_ref()) {
            Some(data_path) => Catalog::from_data_path(data_path),
            None => Catalog::builtin(),
        }
    }

    /// The options file, if any, overridden by the options given on the command line.
    fn render_options(&self, catalog: &Catalog) -> Result<RenderOptions, ContextError> {
        let mut options = match &self.options_path {
            Some(options_path) => RenderOptions::from_path(options_path)?,
            None => RenderOptions::with_default_projects(&catalog.data),
        };
        if let Some(theme) = &self.theme {
            options.theme = theme.parse::<Theme>()?;
        }
        if let Some(language) = &self.language {
            options.language = language.parse::<Language>()?;
        }
        if let Some(version) = &self.version {
            options.version = version.parse::<Version>()?;
        }
        if !self.projects.is_empty() {
            options.selected_projects = self.projects.clone();
        }
        for hidden_section in self.hidden_sections.iter() {
            match hidden_section {
                OptionalSection::Interests => options.visible_sections.interests = false,
                OptionalSection::Certifications => options.visible_sections.certifications = false,
                OptionalSection::Extracurricular => {
                    options.visible_sections.extracurricular = false
                }
            }
        }

        Ok(options)
    }
}

fn main() {
    if let Err(error) = fallible_main() {
        log::error!("{}", error);
        std::process::exit(1);
    }
}

fn fallible_main() -> Result<(), ContextError> {
    let arguments = CliArguments::parse();
    let level_filter = match arguments.verbosity {
        0 => log::LevelFilter::Info,
        1 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    env_logger::builder().filter_level(level_filter).init();
    log::debug!("{:?}", arguments);

    match arguments.command {
        Command::Download {
            render,
            output_directory,
        } => {
            let configuration = render.configuration()?;
            let catalog = render.catalog(&configuration)?;
            let options = render.render_options(&catalog)?;
            let downloaded_cv = Exporter::with_configuration(&catalog, configuration)
                .download_pdf_with_progress(&options, &output_directory, |progress| {
                    log::info!("{}", progress)
                })?;
            println!("{}", downloaded_cv.path.display());
        }
        Command::Attachment {
            render,
            recipient_email,
            recipient_name,
            subject,
            message,
        } => {
            let configuration = render.configuration()?;
            let catalog = render.catalog(&configuration)?;
            let options = render.render_options(&catalog)?;
            let exporter = Exporter::with_configuration(&catalog, configuration);

            let payload = match recipient_email {
                Some(recipient_email) => {
                    let request = EmailRequest {
                        recipient_email,
                        recipient_name,
                        subject,
                        message,
                    };
                    CvEmail::prepare(&exporter, &request, &options)?.to_json()?
                }
                None => serde_json::to_string_pretty(&exporter.email_attachment(&options)?)
                    .map_err(|error| {
                        ContextError::with_error(
                            ErrorKind::Generation,
                            "Failed to serialize the attachment",
                            &error,
                        )
                    })?,
            };
            println!("{}", payload);
        }
    }

    Ok(())
}
