use std::path::PathBuf;

use clap::Subcommand;
use colored::Colorize;
use strum::IntoEnumIterator;
use touchline_lib::{
    ApiClient, CoreConfig, Error, Field, JobTitle, LocalFile, ProfileEditor, ProfileForm,
    SaveOutcome, Session,
    profile::{AvatarSource, UploadStatus},
};

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Show your profile
    Show,
    /// Edit your profile and save it
    Edit {
        /// Set a field, e.g. `--set prenom=Jane`. Fields: prenom, nom, email, pays, ville,
        /// telephone
        #[arg(long = "set", value_name = "FIELD=VALUE", value_parser = parse_assignment)]
        assignments: Vec<(Field, String)>,
        /// New job title: coach, football_player, technical_staff or physical_trainer
        #[arg(long, value_parser = parse_job_title)]
        job_title: Option<JobTitle>,
        /// Image file to upload as the new avatar
        #[arg(long)]
        avatar: Option<PathBuf>,
        /// Stage the changes and print them without saving
        #[arg(long)]
        dry_run: bool,
    },
}

pub async fn handle(
    api: ApiClient,
    cfg: &CoreConfig,
    session: &Session,
    cmd: &Command,
) -> Result<(), Error> {
    let mut editor = ProfileEditor::load(api, &session.subject).await?;

    match cmd {
        Command::Show => {
            print_profile(editor.form(), cfg);
            Ok(())
        }
        Command::Edit {
            assignments,
            job_title,
            avatar,
            dry_run,
        } => {
            editor.begin_edit();

            for (field, value) in assignments {
                editor.set_field(*field, value.clone())?;
            }
            if let Some(title) = job_title {
                editor.set_job_title(*title)?;
            }
            if let Some(path) = avatar {
                let file = LocalFile::read(path)?;
                if let Err(err) = editor.upload_avatar(file).await {
                    if let Some(message) = editor.form().upload_error() {
                        eprintln!("{}", message.red());
                    }
                    return Err(err);
                }
            }

            if *dry_run {
                print_profile(editor.form(), cfg);
                editor.cancel();
                println!("{}", "Dry run, nothing was saved.".yellow());
                return Ok(());
            }

            if editor.form().is_save_disabled() {
                println!("{}", "Nothing to save.".yellow());
                return Ok(());
            }

            match editor.save().await? {
                SaveOutcome::Saved(notice) => println!("{}", notice.green()),
                SaveOutcome::Failed | SaveOutcome::Ignored => {}
            }

            editor.reload(&session.subject).await?;
            print_profile(editor.form(), cfg);
            Ok(())
        }
    }
}

fn print_profile(form: &ProfileForm, cfg: &CoreConfig) {
    let profile = form.profile();

    println!("{}", profile.full_name().bold());
    println!("{}", profile.titre_emploi);
    println!("{}", profile.location().dimmed());
    println!();

    for field in Field::iter() {
        println!("{:<12} {}", field.label(), profile.get(field));
    }
    println!("{:<12} {}", "Job Title", profile.titre_emploi);

    let avatar = match form
        .avatar()
        .source(&cfg.base_endpoint, &cfg.placeholder_avatar)
    {
        AvatarSource::Preview(file) => format!("{} (not uploaded)", file.name()),
        AvatarSource::Remote(url) => url,
        AvatarSource::Placeholder(url) => format!("{url} (placeholder)"),
    };
    println!("{:<12} {}", "Avatar", avatar);

    if form.upload_status() == UploadStatus::Success {
        println!("{}", "New avatar staged.".cyan());
    }
}

fn parse_assignment(raw: &str) -> Result<(Field, String), String> {
    let (name, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected FIELD=VALUE, got '{raw}'"))?;
    let field = name.trim().parse::<Field>().map_err(|_| {
        let known: Vec<String> = Field::iter().map(|f| f.to_string()).collect();
        format!("unknown field '{name}', expected one of {}", known.join(", "))
    })?;

    Ok((field, value.to_string()))
}

fn parse_job_title(raw: &str) -> Result<JobTitle, String> {
    raw.parse::<JobTitle>().map_err(|_| {
        let known: Vec<&str> = JobTitle::iter().map(|t| t.as_str()).collect();
        format!("unknown job title '{raw}', expected one of {}", known.join(", "))
    })
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_parse_assignment() {
        assert_eq!(
            parse_assignment("prenom=Jane").unwrap(),
            (Field::Prenom, "Jane".to_string())
        );
        assert_eq!(
            parse_assignment("email=a=b@c").unwrap(),
            (Field::Email, "a=b@c".to_string())
        );
        assert!(parse_assignment("prenom").is_err());
        assert!(parse_assignment("statut=x").is_err());
    }

    #[test]
    fn test_parse_job_title() {
        assert_eq!(
            parse_job_title("technical_staff").unwrap(),
            JobTitle::TechnicalStaff
        );
        assert!(parse_job_title("referee").is_err());
    }
}
