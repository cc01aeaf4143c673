//! Line-oriented front end over [`ContactSession`].

use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::thread;
use std::time::Instant;

use chrono::Local;
use thiserror::Error;

use crate::domain::contact::Contact;
use crate::domain::types::ContactId;
use crate::dto::view::{EmptyState, ListView};
use crate::format::{format_date, format_phone};
use crate::forms::ContactField;
use crate::forms::contact::ContactEditor;
use crate::forms::image::{DecodeProbe, ImageFile};
use crate::pagination::PageLink;
use crate::services::ServiceError;
use crate::services::contacts::{ConfirmOutcome, ContactSession, SubmitOutcome};
use crate::services::notification::NotificationState;
use crate::transport::{ContactReader, ContactWriter};

const HELP: &str = "\
Comandos:
  list                 recarrega a lista
  search [termo]       busca por nome, email ou telefone (vazio limpa a busca)
  page <n>             vai para a página n
  next | prev          próxima / página anterior
  show <id>            mostra um contato
  new                  abre o formulário de novo contato
  edit <id>            edita um contato
  set <campo> <valor>  campos: name, email, phone, dateOfBirth (AAAA-MM-DD)
  image <arquivo>      anexa uma foto de perfil
  save                 envia o formulário
  delete <id>          exclui um contato
  confirm              confirma a ação pendente
  cancel | close       fecha a notificação ou o formulário
  retry                repete o último carregamento
  help                 mostra esta ajuda
  quit                 sai";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    List,
    Search(String),
    /// 1-based page number as typed.
    Page(usize),
    Next,
    Prev,
    Show(i64),
    New,
    Edit(i64),
    Set(ContactField, String),
    Image(PathBuf),
    Save,
    Delete(i64),
    Confirm,
    Cancel,
    Retry,
    Help,
    Quit,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("Comando desconhecido: {0}. Digite 'help' para ver os comandos.")]
    Unknown(String),
    #[error("O comando '{0}' precisa de um argumento.")]
    MissingArgument(&'static str),
    #[error("Número inválido: {0}")]
    InvalidNumber(String),
    #[error("Campo desconhecido: {0}")]
    UnknownField(String),
}

fn number<T: FromStr>(command: &'static str, arg: &str) -> Result<T, CommandError> {
    if arg.is_empty() {
        return Err(CommandError::MissingArgument(command));
    }
    arg.parse()
        .map_err(|_| CommandError::InvalidNumber(arg.to_string()))
}

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (name, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
        let rest = rest.trim();

        match name.to_lowercase().as_str() {
            "list" | "ls" => Ok(Self::List),
            "search" => Ok(Self::Search(rest.to_string())),
            "page" => {
                let page: usize = number("page", rest)?;
                if page == 0 {
                    return Err(CommandError::InvalidNumber(rest.to_string()));
                }
                Ok(Self::Page(page))
            }
            "next" => Ok(Self::Next),
            "prev" => Ok(Self::Prev),
            "show" => Ok(Self::Show(number("show", rest)?)),
            "new" => Ok(Self::New),
            "edit" => Ok(Self::Edit(number("edit", rest)?)),
            "set" => {
                let (key, value) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
                if key.is_empty() {
                    return Err(CommandError::MissingArgument("set"));
                }
                let field = ContactField::from_key(key)
                    .ok_or_else(|| CommandError::UnknownField(key.to_string()))?;
                Ok(Self::Set(field, value.trim().to_string()))
            }
            "image" => {
                if rest.is_empty() {
                    return Err(CommandError::MissingArgument("image"));
                }
                Ok(Self::Image(PathBuf::from(rest)))
            }
            "save" => Ok(Self::Save),
            "delete" | "rm" => Ok(Self::Delete(number("delete", rest)?)),
            "confirm" | "yes" => Ok(Self::Confirm),
            "cancel" | "close" | "no" => Ok(Self::Cancel),
            "retry" => Ok(Self::Retry),
            "help" | "?" => Ok(Self::Help),
            "quit" | "exit" => Ok(Self::Quit),
            other => Err(CommandError::Unknown(other.to_string())),
        }
    }
}

/// MIME type inferred from the file extension.
fn guess_mime(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_lowercase);
    match extension.as_deref() {
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        _ => "application/octet-stream",
    }
}

/// Reads an image from disk with its name and inferred MIME type.
pub fn load_image(path: &Path) -> io::Result<ImageFile> {
    let bytes = fs::read(path)?;
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    Ok(ImageFile::new(file_name, guess_mime(path), bytes))
}

fn contact_line(index: usize, contact: &Contact) -> String {
    format!(
        "{index:>4}. {} | {} | {} | {}",
        contact.name,
        contact.email,
        format_phone(contact.phone.as_str()),
        format_date(contact.date_of_birth)
    )
}

pub fn render_list<W: Write>(out: &mut W, view: &ListView) -> io::Result<()> {
    if !view.search_term.trim().is_empty() {
        writeln!(out, "Busca: \"{}\"", view.search_term.trim())?;
    }
    if view.is_loading {
        writeln!(out, "Carregando...")?;
    }
    if let Some(error) = &view.error {
        writeln!(out, "{error} (digite 'retry' para tentar novamente)")?;
    }
    for row in &view.rows {
        writeln!(out, "{}", contact_line(row.index, &row.contact))?;
    }
    if let Some(empty) = &view.empty {
        writeln!(out, "{}", empty.message())?;
        if matches!(empty, EmptyState::NoResults { .. }) {
            writeln!(out, "Digite 'search' sem termo para limpar a busca.")?;
        }
    }
    if !view.pager.links.is_empty() {
        let links: Vec<String> = view
            .pager
            .links
            .iter()
            .map(|link| match link {
                PageLink::Page(page) if *page == view.pager.current_page => {
                    format!("[{}]", page + 1)
                }
                PageLink::Page(page) => (page + 1).to_string(),
                PageLink::Ellipsis => "...".to_string(),
            })
            .collect();
        writeln!(out, "Páginas: {}", links.join(" "))?;
    }
    writeln!(out, "Total: {} contato(s)", view.total_elements)
}

pub fn render_notification<W: Write>(out: &mut W, state: &NotificationState) -> io::Result<()> {
    let (Some(title), Some(message)) = (state.title(), state.message()) else {
        return Ok(());
    };
    writeln!(out, "== {title} ==")?;
    writeln!(out, "{message}")?;
    if let NotificationState::ConfirmUpdate(pending) = state {
        for line in pending.summary.render() {
            writeln!(out, "  {line}")?;
        }
    }
    if state.is_confirmation() {
        writeln!(out, "Digite 'confirm' para confirmar ou 'cancel' para cancelar.")?;
    }
    Ok(())
}

pub fn render_editor<W: Write>(out: &mut W, editor: &ContactEditor) -> io::Result<()> {
    let title = if editor.is_update() {
        "Editar contato"
    } else {
        "Novo contato"
    };
    writeln!(out, "-- {title} --")?;
    let form = &editor.form;
    let values = [
        (ContactField::Name, form.name.as_str()),
        (ContactField::Email, form.email.as_str()),
        (ContactField::Phone, form.phone.as_str()),
        (ContactField::DateOfBirth, form.date_of_birth.as_str()),
    ];
    for (field, value) in values {
        writeln!(out, "{:<20} {value}", format!("{} ({}):", field.label(), field.key()))?;
        if let Some(error) = editor.errors.get(field) {
            writeln!(out, "  ! {error}")?;
        }
    }
    match (&form.image, &form.profile_picture) {
        (Some(image), _) => writeln!(out, "Foto: {} (nova)", image.file_name)?,
        (None, Some(_)) => writeln!(out, "Foto: atual")?,
        (None, None) => writeln!(out, "Foto: nenhuma")?,
    }
    if let Some(rejection) = &editor.image_error {
        writeln!(out, "  ! {rejection}")?;
    }
    Ok(())
}

fn render_contact<W: Write>(out: &mut W, contact: &Contact) -> io::Result<()> {
    writeln!(out, "Contato #{}", contact.id)?;
    writeln!(out, "  Nome: {}", contact.name)?;
    writeln!(out, "  E-mail: {}", contact.email)?;
    writeln!(out, "  Telefone: {}", format_phone(contact.phone.as_str()))?;
    writeln!(
        out,
        "  Data de Nascimento: {}",
        format_date(contact.date_of_birth)
    )?;
    if let Some(picture) = &contact.profile_picture {
        writeln!(out, "  Foto: {picture}")?;
    }
    Ok(())
}

fn render_service_error<W: Write>(out: &mut W, error: &ServiceError) -> io::Result<()> {
    match error {
        ServiceError::Validation(errors) => {
            writeln!(out, "Corrija os campos destacados:")?;
            for (key, message) in errors.messages() {
                writeln!(out, "  {key}: {message}")?;
            }
            Ok(())
        }
        ServiceError::NoEditor => {
            writeln!(out, "Nenhum formulário aberto. Use 'new' ou 'edit <id>'.")
        }
        ServiceError::NoPendingAction => writeln!(out, "Nenhuma ação aguardando confirmação."),
        // Shown by the notification and the editor respectively.
        ServiceError::Transport(_) | ServiceError::ImageRejected(_) => Ok(()),
        other => writeln!(out, "{other}"),
    }
}

fn contact_id<W: Write>(out: &mut W, raw: i64) -> io::Result<Option<ContactId>> {
    match ContactId::new(raw) {
        Ok(id) => Ok(Some(id)),
        Err(err) => {
            writeln!(out, "Id inválido: {err}")?;
            Ok(None)
        }
    }
}

/// Applies one command. Returns `false` when the user asked to quit.
pub fn execute<T, W>(
    session: &mut ContactSession,
    transport: &T,
    command: Command,
    out: &mut W,
) -> io::Result<bool>
where
    T: ContactReader + ContactWriter + ?Sized,
    W: Write,
{
    let mut show_list = false;

    match command {
        Command::Quit => return Ok(false),
        Command::Help => writeln!(out, "{HELP}")?,
        Command::List => {
            session.start(transport);
            show_list = true;
        }
        Command::Search(term) => {
            session.search(transport, &term, Instant::now());
            show_list = true;
        }
        Command::Page(page) => {
            session.go_to_page(transport, page - 1);
            show_list = true;
        }
        Command::Next => {
            let view = session.view();
            if view.pager.has_next {
                session.go_to_page(transport, view.pager.current_page + 1);
            }
            show_list = true;
        }
        Command::Prev => {
            let view = session.view();
            if view.pager.has_previous {
                session.go_to_page(transport, view.pager.current_page - 1);
            }
            show_list = true;
        }
        Command::Retry => {
            session.retry(transport);
            show_list = true;
        }
        Command::Show(raw) => {
            if let Some(id) = contact_id(out, raw)? {
                match session.show(transport, id) {
                    Ok(contact) => render_contact(out, &contact)?,
                    Err(err) => render_service_error(out, &err)?,
                }
            }
        }
        Command::New => session.open_create(),
        Command::Edit(raw) => {
            if let Some(id) = contact_id(out, raw)?
                && let Err(err) = session.open_edit_by_id(transport, id)
            {
                render_service_error(out, &err)?;
            }
        }
        Command::Set(field, value) => {
            if let Err(err) = session.set_field(field, &value) {
                render_service_error(out, &err)?;
            }
        }
        Command::Image(path) => match load_image(&path) {
            Ok(file) => {
                if let Err(err) = session.attach_image(file, &DecodeProbe) {
                    render_service_error(out, &err)?;
                }
            }
            Err(err) => writeln!(out, "Não foi possível ler {}: {err}", path.display())?,
        },
        Command::Save => match session.submit(transport, Local::now().date_naive()) {
            Ok(SubmitOutcome::Created(_)) => show_list = true,
            Ok(SubmitOutcome::AwaitingConfirmation | SubmitOutcome::Failed(_)) => {}
            Err(err) => render_service_error(out, &err)?,
        },
        Command::Delete(raw) => {
            if let Some(id) = contact_id(out, raw)?
                && let Err(err) = session.request_delete_by_id(transport, id)
            {
                render_service_error(out, &err)?;
            }
        }
        Command::Confirm => match session.confirm(transport) {
            Ok(ConfirmOutcome::Deleted(_) | ConfirmOutcome::Updated(_)) => show_list = true,
            Ok(ConfirmOutcome::Failed(_)) => {}
            Err(err) => render_service_error(out, &err)?,
        },
        Command::Cancel => {
            if session.notification().is_none() {
                session.close_editor();
            } else {
                session.close_notification();
            }
        }
    }

    // Debounced search: wait out the window, then fire.
    while let Some(deadline) = session.list().next_deadline() {
        thread::sleep(deadline.saturating_duration_since(Instant::now()));
        session.tick(transport, Instant::now());
    }

    render_notification(out, session.notification())?;
    if let Some(editor) = session.editor()
        && session.notification().is_none()
    {
        render_editor(out, editor)?;
    }
    if show_list {
        render_list(out, &session.view())?;
    }
    Ok(true)
}

/// Reads commands from `input` until `quit` or end of input.
pub fn run<T, R, W>(
    session: &mut ContactSession,
    transport: &T,
    input: R,
    mut out: W,
) -> io::Result<()>
where
    T: ContactReader + ContactWriter + ?Sized,
    R: BufRead,
    W: Write,
{
    writeln!(out, "Agenda de contatos. Digite 'help' para ver os comandos.")?;
    session.start(transport);
    render_list(&mut out, &session.view())?;

    for line in input.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        match line.parse::<Command>() {
            Ok(command) => {
                if !execute(session, transport, command, &mut out)? {
                    break;
                }
            }
            Err(err) => writeln!(out, "{err}")?,
        }
        out.flush()?;
    }
    Ok(())
}
