use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use dictionary::persist::{self, DELIMITER};
use dictionary::{LoadOutcome, Popularity, WordTree, sample_tree};
use log::debug;

const RANKING_SIZE: usize = 3;

pub struct ShellConfig {
    pub file: PathBuf,
    /// Load the file at startup and save it again on exit.
    pub persist: bool,
}

enum Flow {
    Continue,
    Exit,
}

enum Reload {
    Read,
    Missing,
    Failed,
}

pub struct Shell<R, W> {
    input: R,
    out: W,
    tree: WordTree,
    config: ShellConfig,
    /// Cleared when the startup load fails, so exit cannot overwrite that file.
    save_on_exit: bool,
}

impl<R: BufRead, W: Write> Shell<R, W> {
    pub fn new(input: R, out: W, config: ShellConfig) -> Self {
        Self {
            input,
            out,
            tree: WordTree::new(),
            save_on_exit: config.persist,
            config,
        }
    }

    pub fn run(&mut self) -> io::Result<()> {
        self.startup()?;
        loop {
            self.print_menu()?;
            let Some(line) = self.read_line()? else {
                self.exit()?;
                return Ok(());
            };
            let flow = match line.parse::<u32>() {
                Ok(1) => self.display()?,
                Ok(2) => self.find()?,
                Ok(3) => self.add()?,
                Ok(4) => self.delete()?,
                Ok(5) => self.ranking(Popularity::Most)?,
                Ok(6) => self.ranking(Popularity::Least)?,
                Ok(7) => self.save()?,
                Ok(8) => self.load()?,
                Ok(9) => self.change_file()?,
                Ok(0) => {
                    self.exit()?;
                    Flow::Exit
                }
                _ => {
                    writeln!(self.out, "Invalid choice. Please try again.")?;
                    Flow::Continue
                }
            };
            if let Flow::Exit = flow {
                return Ok(());
            }
        }
    }

    fn startup(&mut self) -> io::Result<()> {
        if self.config.persist {
            match self.reload()? {
                Reload::Read => return Ok(()),
                Reload::Missing => {}
                Reload::Failed => {
                    self.save_on_exit = false;
                    writeln!(
                        self.out,
                        "Exit will not save over {}; use 7 to save explicitly.",
                        self.config.file.display()
                    )?;
                }
            }
        }
        writeln!(self.out, "Initializing dictionary with sample words...")?;
        self.tree = sample_tree();
        Ok(())
    }

    fn print_menu(&mut self) -> io::Result<()> {
        writeln!(self.out)?;
        writeln!(self.out, "=== English-Ukrainian Dictionary ===")?;
        writeln!(self.out, "1. Display dictionary")?;
        writeln!(self.out, "2. Find and display word")?;
        writeln!(self.out, "3. Add or update word")?;
        writeln!(self.out, "4. Delete word")?;
        writeln!(self.out, "5. Show top {RANKING_SIZE} most popular words")?;
        writeln!(self.out, "6. Show top {RANKING_SIZE} least popular words")?;
        writeln!(self.out, "7. Save dictionary")?;
        writeln!(self.out, "8. Load dictionary")?;
        writeln!(
            self.out,
            "9. Change dictionary file (current: {})",
            self.config.file.display()
        )?;
        writeln!(self.out, "0. Exit")?;
        write!(self.out, "Enter your choice: ")?;
        self.out.flush()
    }

    /// Next trimmed input line, `None` at end of input. Bytes that are not
    /// UTF-8 become replacement characters instead of ending the session.
    fn read_line(&mut self) -> io::Result<Option<String>> {
        let mut buf = Vec::new();
        if self.input.read_until(b'\n', &mut buf)? == 0 {
            return Ok(None);
        }
        Ok(Some(String::from_utf8_lossy(&buf).trim().to_string()))
    }

    fn prompt(&mut self, message: &str) -> io::Result<Option<String>> {
        write!(self.out, "{message}")?;
        self.out.flush()?;
        self.read_line()
    }

    fn prompt_field(&mut self, message: &str) -> io::Result<Option<String>> {
        let Some(field) = self.prompt(message)? else {
            return Ok(None);
        };
        if field.contains(DELIMITER) {
            writeln!(self.out, "Words may not contain '{DELIMITER}'.")?;
            return Ok(None);
        }
        Ok(Some(field))
    }

    fn display(&mut self) -> io::Result<Flow> {
        if self.tree.is_empty() {
            writeln!(self.out, "Dictionary is empty.")?;
            return Ok(Flow::Continue);
        }
        writeln!(self.out, "Dictionary contents:")?;
        for entry in &self.tree {
            writeln!(self.out, "{entry}")?;
        }
        Ok(Flow::Continue)
    }

    fn find(&mut self) -> io::Result<Flow> {
        let Some(word) = self.prompt("Enter English word: ")? else {
            return Ok(Flow::Continue);
        };
        match self.tree.touch(&word) {
            Some(entry) => {
                writeln!(self.out, "Word: {}", entry.key)?;
                writeln!(self.out, "Translation: {}", entry.value)?;
                writeln!(self.out, "Access count: {}", entry.count)?;
            }
            None => writeln!(self.out, "Word '{word}' not found in dictionary.")?,
        }
        Ok(Flow::Continue)
    }

    fn add(&mut self) -> io::Result<Flow> {
        let Some(word) = self.prompt_field("Enter English word: ")? else {
            return Ok(Flow::Continue);
        };
        if word.is_empty() {
            writeln!(self.out, "Word may not be empty.")?;
            return Ok(Flow::Continue);
        }
        let Some(translation) = self.prompt_field("Enter Ukrainian translation: ")? else {
            return Ok(Flow::Continue);
        };
        let Some(count) = self.prompt("Enter initial access count (0 for new words): ")? else {
            return Ok(Flow::Continue);
        };
        let Ok(count) = count.parse::<u64>() else {
            writeln!(self.out, "Invalid access count '{count}'.")?;
            return Ok(Flow::Continue);
        };
        self.tree.insert_with_count(word, translation, count);
        writeln!(self.out, "Word added/updated successfully.")?;
        Ok(Flow::Continue)
    }

    fn delete(&mut self) -> io::Result<Flow> {
        let Some(word) = self.prompt("Enter English word to delete: ")? else {
            return Ok(Flow::Continue);
        };
        if self.tree.remove(&word).is_some() {
            writeln!(self.out, "Word '{word}' deleted from dictionary.")?;
        } else {
            writeln!(self.out, "Word '{word}' not found in dictionary.")?;
        }
        Ok(Flow::Continue)
    }

    fn ranking(&mut self, popularity: Popularity) -> io::Result<Flow> {
        let ranked = self.tree.top_by_count(RANKING_SIZE, popularity);
        if ranked.is_empty() {
            writeln!(self.out, "Dictionary is empty :(")?;
            return Ok(Flow::Continue);
        }
        let label = match popularity {
            Popularity::Most => "most",
            Popularity::Least => "least",
        };
        writeln!(self.out, "Top {RANKING_SIZE} {label} popular words:")?;
        for (rank, entry) in ranked.into_iter().enumerate() {
            writeln!(self.out, "{}. {entry}", rank + 1)?;
        }
        Ok(Flow::Continue)
    }

    fn save(&mut self) -> io::Result<Flow> {
        let path = self.config.file.display();
        match persist::save(&self.tree, &self.config.file) {
            Ok(written) => writeln!(self.out, "Saved {written} words to {path}.")?,
            Err(e) => writeln!(self.out, "Could not save dictionary: {e}")?,
        }
        Ok(Flow::Continue)
    }

    fn load(&mut self) -> io::Result<Flow> {
        self.reload()?;
        Ok(Flow::Continue)
    }

    /// Replaces the words with the active file's contents. A missing file
    /// empties the dictionary, a failed read keeps it.
    fn reload(&mut self) -> io::Result<Reload> {
        let path = self.config.file.display();
        match persist::load(&self.config.file) {
            Ok(LoadOutcome::Loaded { tree, skipped }) => {
                self.tree = tree;
                writeln!(self.out, "Loaded {} words from {path}.", self.tree.len())?;
                if !skipped.is_empty() {
                    writeln!(self.out, "Skipped {} malformed lines.", skipped.len())?;
                }
                if self.config.persist {
                    self.save_on_exit = true;
                }
                Ok(Reload::Read)
            }
            Ok(LoadOutcome::Missing) => {
                self.tree = WordTree::new();
                writeln!(
                    self.out,
                    "File {path} not found, starting with an empty dictionary."
                )?;
                Ok(Reload::Missing)
            }
            Err(e) => {
                writeln!(self.out, "Could not load dictionary: {e}")?;
                Ok(Reload::Failed)
            }
        }
    }

    fn change_file(&mut self) -> io::Result<Flow> {
        let Some(file) = self.prompt("Enter new file name: ")? else {
            return Ok(Flow::Continue);
        };
        if file.is_empty() {
            writeln!(self.out, "File name may not be empty.")?;
            return Ok(Flow::Continue);
        }
        debug!("active file {} -> {file}", self.config.file.display());
        self.config.file = PathBuf::from(file);
        self.save_on_exit = self.config.persist;
        writeln!(self.out, "Active file is now {}.", self.config.file.display())?;
        Ok(Flow::Continue)
    }

    fn exit(&mut self) -> io::Result<()> {
        if self.save_on_exit {
            self.save()?;
        }
        writeln!(self.out, "Exiting program. Goodbye!")
    }
}

#[cfg(test)]
mod tests {
    use super::{Shell, ShellConfig};
    use std::fs;
    use std::io::Cursor;
    use std::path::PathBuf;
    use tempfile::tempdir;

    fn run(script: &str, file: PathBuf, persist: bool) -> String {
        run_bytes(script.as_bytes(), file, persist)
    }

    fn run_bytes(script: &[u8], file: PathBuf, persist: bool) -> String {
        let mut out = Vec::new();
        Shell::new(Cursor::new(script.to_vec()), &mut out, ShellConfig { file, persist })
            .run()
            .unwrap();
        String::from_utf8(out).unwrap()
    }

    fn in_memory(script: &str) -> String {
        run(script, PathBuf::from("unused.txt"), false)
    }

    #[test]
    fn rankings_on_sample_words() {
        let out = in_memory("5\n6\n0\n");
        assert!(out.contains("Initializing dictionary with sample words..."));
        assert!(out.contains(
            "Top 3 most popular words:\n\
             1. computer - комп'ютер (Access count: 10)\n\
             2. student - студент (Access count: 8)\n\
             3. book - книга (Access count: 7)\n"
        ));
        assert!(out.contains(
            "Top 3 least popular words:\n\
             1. professor - професор (Access count: 1)\n\
             2. university - університет (Access count: 2)\n\
             3. world - світ (Access count: 3)\n"
        ));
        assert!(out.ends_with("Exiting program. Goodbye!\n"));
    }

    #[test]
    fn find_bumps_count_each_time() {
        let out = in_memory("2\nbook\n2\nbook\n2\nbooks\n0\n");
        assert!(out.contains("Word: book\nTranslation: книга\nAccess count: 8\n"));
        assert!(out.contains("Access count: 9\n"));
        assert!(out.contains("Word 'books' not found in dictionary."));
    }

    #[test]
    fn add_update_and_delete() {
        let out = in_memory("3\napple\nяблуко\n4\n3\nbook\nкнижка\n0\n4\nhello\n4\nhello\n1\n0\n");
        assert_eq!(out.matches("Word added/updated successfully.").count(), 2);
        assert!(out.contains("Word 'hello' deleted from dictionary."));
        assert!(out.contains("Word 'hello' not found in dictionary."));
        assert!(out.contains(
            "Dictionary contents:\n\
             apple - яблуко (Access count: 4)\n\
             book - книжка (Access count: 0)\n\
             computer - комп'ютер (Access count: 10)\n"
        ));
    }

    #[test]
    fn rejects_bad_input() {
        let out = in_memory("42\nabc\n3\na|b\n3\nword\nслово\nmany\n1\n0\n");
        assert_eq!(out.matches("Invalid choice. Please try again.").count(), 2);
        assert!(out.contains("Words may not contain '|'."));
        assert!(out.contains("Invalid access count 'many'."));
        assert!(!out.contains("word - слово"));
    }

    #[test]
    fn empty_dictionary_messages() {
        let script = "4\nhello\n4\nworld\n4\nbook\n4\ncomputer\n4\nuniversity\n4\nstudent\n4\nprofessor\n1\n5\n6\n0\n";
        let out = in_memory(script);
        assert!(out.contains("Dictionary is empty.\n"));
        assert_eq!(out.matches("Dictionary is empty :(").count(), 2);
    }

    #[test]
    fn end_of_input_exits() {
        let out = in_memory("1\n");
        assert!(out.ends_with("Exiting program. Goodbye!\n"));
    }

    #[test]
    fn persisted_session_saves_on_exit_and_reloads() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("dictionary.txt");

        let first = run("2\nbook\n4\nhello\n0\n", path.clone(), true);
        assert!(first.contains("not found, starting with an empty dictionary."));
        assert!(first.contains("Initializing dictionary with sample words..."));
        assert!(first.contains("Saved 6 words to"));
        let saved = fs::read_to_string(&path).unwrap();
        assert!(saved.starts_with("book|книга|8\ncomputer|комп'ютер|10\n"));
        assert!(!saved.contains("hello"));

        let second = run("1\n0\n", path.clone(), true);
        assert!(second.contains("Loaded 6 words from"));
        assert!(!second.contains("Initializing dictionary with sample words..."));
        assert!(second.contains("book - книга (Access count: 8)"));
    }

    #[test]
    fn change_file_then_save_and_load() {
        let dir = tempdir().unwrap();
        let other = dir.path().join("other.txt");
        fs::write(&other, "zebra|зебра|2\nbroken line\n").unwrap();

        let script = format!("9\n{}\n8\n1\n0\n", other.display());
        let out = run(&script, PathBuf::from("unused.txt"), false);
        assert!(out.contains(&format!("Active file is now {}.", other.display())));
        assert!(out.contains("Loaded 1 words from"));
        assert!(out.contains("Skipped 1 malformed lines."));
        assert!(out.contains("Dictionary contents:\nzebra - зебра (Access count: 2)\n"));
        // In-memory sessions never write on exit.
        assert_eq!(
            fs::read_to_string(&other).unwrap(),
            "zebra|зебра|2\nbroken line\n"
        );
    }

    #[test]
    fn failed_load_keeps_current_words() {
        let dir = tempdir().unwrap();
        let script = format!("9\n{}\n8\n7\n2\nbook\n0\n", dir.path().display());
        let out = run(&script, PathBuf::from("unused.txt"), false);
        assert!(out.contains("Could not load dictionary:"));
        assert!(out.contains("Could not save dictionary:"));
        assert!(out.contains("Word: book\nTranslation: книга\nAccess count: 8\n"));
    }

    #[test]
    fn non_utf8_input_does_not_end_the_session() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("dictionary.txt");

        let out = run_bytes(b"3\napple\n\xFF\xFE\n4\n0\n", path.clone(), true);
        assert!(out.contains("Word added/updated successfully."));
        assert!(out.ends_with("Exiting program. Goodbye!\n"));
        let saved = fs::read_to_string(&path).unwrap();
        assert!(saved.starts_with("apple|\u{FFFD}\u{FFFD}|4\n"));
    }

    #[test]
    fn failed_startup_load_disables_exit_save() {
        let dir = tempdir().unwrap();
        let out = run("1\n0\n", dir.path().to_path_buf(), true);
        assert!(out.contains("Could not load dictionary:"));
        assert!(out.contains("Exit will not save over"));
        assert!(out.contains("Initializing dictionary with sample words..."));
        assert!(!out.contains("Saved "));
        assert!(!out.contains("Could not save dictionary:"));
    }

    #[test]
    fn changing_file_after_failed_startup_restores_exit_save() {
        let dir = tempdir().unwrap();
        let other = dir.path().join("other.txt");
        let script = format!("9\n{}\n0\n", other.display());
        let out = run(&script, dir.path().to_path_buf(), true);
        assert!(out.contains("Exit will not save over"));
        assert!(out.contains("Saved 7 words to"));
        assert!(fs::read_to_string(&other).unwrap().starts_with("book|книга|7\n"));
    }
}
