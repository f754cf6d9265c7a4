//! Text templates for the files generated inside topics and tutorials.
//!
//! The generated pages are rendered by the training website (Jekyll), so the
//! `{% ... %}` and `{: ... }` sequences below are Liquid and kramdown syntax
//! that must reach the output untouched.

use std::sync::LazyLock;

use regex::{Captures, Regex};

/// Placeholder in a tutorial body standing for the Zenodo file URLs until
/// there are some.
pub const Z_FILE_LINKS_MARKER: &str = "{{ z_file_links }}";

/// The Zenodo link and the file block of the data-upload box.
static DATA_UPLOAD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?s)\[Zenodo\]\(([^)\n]*)\)( or from the shared data library\r?\n>\r?\n>    ```\r?\n)(.*?)(\r?\n>    ```)",
    )
    .expect("data upload pattern is valid")
});

/// Indentation unit for nested parameter lists in hands-on boxes.
pub const SPACE: &str = "    ";

/// The `index.md` of a topic.
#[must_use]
pub fn topic_index(name: &str) -> String {
    format!("---\nlayout: topic\ntopic_name: {name}\n---\n")
}

/// The `README.md` of a topic.
#[must_use]
pub fn topic_readme(title: &str) -> String {
    let underline = "=".repeat(title.chars().count().max(3));
    format!(
        "{title}\n{underline}\n\nPlease refer to the [CONTRIBUTING.md](../../CONTRIBUTING.md) before \
         adding or updating any material\n"
    )
}

/// The Docker recipe bundling the tools of a topic.
#[must_use]
pub fn topic_dockerfile(name: &str, title: &str) -> String {
    format!(
        r#"# Galaxy - {title}

FROM bgruening/galaxy-stable:latest

MAINTAINER Galaxy Training Material

ENV GALAXY_CONFIG_BRAND "GTN: {title}"

# prerequisites
RUN pip install ephemeris -U
ADD bin/galaxy-sleep.py /galaxy-sleep.py

# copy the tutorials directory for your topic
ADD topics/{name}/tutorials/ /tutorials/

# install everything for tutorials
ADD bin/docker-install-tutorials.sh /setup-tutorials.sh
ADD bin/mergeyaml.py /mergeyaml.py
ADD bin/data_library_download.sh /data_library_download.sh
RUN /setup-tutorials.sh
"#
    )
}

/// The introduction slide deck of a topic.
#[must_use]
pub fn topic_intro_slides(title: &str) -> String {
    format!(
        r#"---
layout: introduction_slides
logo: "GTN"

title: {title}
type: introduction
contributors:
- contributor
---

### How to fill the slide decks?

Please follow our
[tutorial to learn how to fill the slides](/training-material/topics/contributing/tutorials/create-new-tutorial-slides/slides.html)
"#
    )
}

/// The slide deck of a tutorial, headed by the tutorial metadata.
#[must_use]
pub fn tutorial_slides(metadata: &str) -> String {
    format!(
        r#"---
layout: tutorial_slides
logo: "GTN"

{metadata}---

### How to fill the slide decks?

Please follow our
[tutorial to learn how to fill the slides](/training-material/topics/contributing/tutorials/create-new-tutorial-slides/slides.html)
"#
    )
}

/// One hands-on section for a workflow step.
///
/// `params` is the pre-rendered list of inputs and parameters, each line
/// starting with a newline.
#[must_use]
pub fn hands_on_box(tool_name: &str, params: &str) -> String {
    format!(
        r#"
## Sub-step with **{tool_name}**

> ### {{% icon hands_on %}} Hands-on: Task description
>
> 1. **{tool_name}** {{% icon tool %}} with the following parameters:{params}
>
>    ***TODO***: *Check parameter descriptions*
>
>    ***TODO***: *Consider adding a comment or tip box*
>
>    > ### {{% icon comment %}} Comment
>    >
>    > A comment about the tool or something else. This box can also be in the main text
>    {{: .comment}}
>
{{: .hands_on}}

***TODO***: *Consider adding a question to test the learners understanding of the previous exercise*

> ### {{% icon question %}} Questions
>
> 1. Question1?
> 2. Question2?
>
> > ### {{% icon solution %}} Solution
> >
> > 1. Answer for question1
> > 2. Answer for question2
> >
> {{: .solution}}
>
{{: .question}}
"#
    )
}

/// The hands-on section used when no workflow is available.
#[must_use]
pub fn default_hands_on_box() -> String {
    let params = format!(
        "{}{}",
        input_file_line(SPACE, "param-file", "Input file", "File"),
        param_line(SPACE, "Parameter", "a value")
    );
    hands_on_box("My Tool", &params)
}

/// The body of a hands-on tutorial wrapping the per-step sections.
#[must_use]
pub fn tutorial_body(zenodo_link: &str, steps: &str) -> String {
    format!(
        r#"
# Introduction
{{:.no_toc}}

<!-- This is a comment. -->

General introduction about the topic and then an introduction of the
tutorial (the questions and the objectives). It is nice also to have a
scheme to sum up the pipeline used during the tutorial. The idea is to
give to trainees insight into the content of the tutorial and the (theoretical
and technical) key concepts they will learn.

**Please follow our
[tutorial to learn how to fill the Markdown](/training-material/topics/contributing/tutorials/create-new-tutorial-content/tutorial.html)**

> ### Agenda
>
> In this tutorial, we will cover:
>
> 1. TOC
> {{:toc}}
>
{{: .agenda}}

# Title for your first section

Give some background about what the trainees will be doing in the section.

Below are a series of hand-on boxes, one for each tool in your workflow file.
Often you may wish to combine several boxes into one or make other adjustments such
as breaking the tutorial into sections, we encourage you to make such changes as you
see fit, this is just a starting point :)

Anywhere you find the word "***TODO***", there is something that needs to be changed
depending on the specifics of your tutorial.

have fun!

## Get data

> ### {{% icon hands_on %}} Hands-on: Data upload
>
> 1. Create a new history for this tutorial
> 2. Import the files from [Zenodo]({zenodo_link}) or from the shared data library
>
>    ```
>    {Z_FILE_LINKS_MARKER}
>    ```
>    ***TODO***: *Add the files by the ones on Zenodo here (if not added)*
>
>    ***TODO***: *Remove the useless files (if added)*
>
>    {{% include snippets/import_via_link.md %}}
>    {{% include snippets/import_from_data_library.md %}}
>
> 3. Rename the datasets
> 4. Check that the datatype
>
>    {{% include snippets/change_datatype.md datatype="datatypes" %}}
>
> 5. Add to each database a tag corresponding to ...
>
>    {{% include snippets/add_tag.md %}}
>
{{: .hands_on}}

# Title of the section usually corresponding to a big step in the analysis

It comes first a description of the step: some background and some theory.
Some image can be added there to support the theory explanation:

![Alternative text](../../images/image_name "Legend of the image")

The idea is to keep the theory description before quite simple to focus more on the practical part.

***TODO***: *Consider adding a detail box to expand the theory*

> ### {{% icon details %}} More details about the theory
>
> But to describe more details, it is possible to use the detail boxes which are expandable
>
{{: .details}}

A big step can have several subsections or sub steps:
{steps}
## Re-arrange

To create the template, each step of the workflow had its own subsection.

***TODO***: *Re-arrange the generated subsections into sections or other subsections.
Consider merging some hands-on boxes to have a meaningful flow of the analyses*

# Conclusion
{{:.no_toc}}

Sum up the tutorial and the key takeaways here. We encourage adding an overview image of the
pipeline used.
"#
    )
}

/// Point the data-upload box of a tutorial body at `zenodo_link` and list
/// `file_links` in it.
///
/// Without file links the placeholder is put back, so a later pass can
/// still fill the box. A body without the box is returned unchanged.
#[must_use]
pub fn fill_data_upload(body: &str, zenodo_link: &str, file_links: &[String]) -> String {
    let files = if file_links.is_empty() {
        Z_FILE_LINKS_MARKER.to_string()
    } else {
        file_links.join("\n>    ")
    };
    DATA_UPLOAD
        .replace(body, |caps: &Captures| {
            format!("[Zenodo]({zenodo_link}){}>    {files}{}", &caps[2], &caps[4])
        })
        .into_owned()
}

/// The file URLs listed in the data-upload box of a tutorial body.
#[must_use]
pub fn data_upload_links(body: &str) -> Vec<String> {
    DATA_UPLOAD
        .captures(body)
        .map(|caps| {
            caps[3]
                .lines()
                .map(|line| line.trim_start_matches('>').trim())
                .filter(|line| !line.is_empty() && *line != Z_FILE_LINKS_MARKER)
                .map(ToString::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// A dataset input line: `- {% icon param-file %} *"label"*: value`.
///
/// `icon` is `param-file`, `param-files` or `param-collection`.
#[must_use]
pub fn input_file_line(space: &str, icon: &str, label: &str, value: &str) -> String {
    format!("\n>{space}- {{% icon {icon} %}} *\"{label}\"*: {value}")
}

/// The header line opening a section.
#[must_use]
pub fn section_line(space: &str, label: &str) -> String {
    format!("\n>{space}- In *\"{label}\"*:")
}

/// The line asking to insert one more repeat block.
#[must_use]
pub fn repeat_line(space: &str, label: &str) -> String {
    format!("\n>{space}- Click on *\"Insert {label}\"*:")
}

/// A simple parameter line: `- *"label"*: `value``.
#[must_use]
pub fn param_line(space: &str, label: &str, value: &str) -> String {
    format!("\n>{space}- *\"{label}\"*: `{value}`")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn topic_templates_interpolate() {
        assert!(topic_index("my_topic").contains("topic_name: my_topic"));
        assert!(topic_readme("My Topic").starts_with("My Topic\n========\n"));
        let dockerfile = topic_dockerfile("my_topic", "My Topic");
        assert!(dockerfile.contains("# Galaxy - My Topic"));
        assert!(dockerfile.contains("ADD topics/my_topic/tutorials/ /tutorials/"));
        assert!(topic_intro_slides("My Topic").contains("title: My Topic"));
    }

    #[test]
    fn liquid_syntax_survives_formatting() {
        let hands_on = hands_on_box("FastQC", "");
        assert!(hands_on.contains("## Sub-step with **FastQC**"));
        assert!(hands_on.contains("{% icon hands_on %} Hands-on: Task description"));
        assert!(hands_on.contains("{: .hands_on}"));
    }

    #[test]
    fn body_keeps_link_marker() {
        let body = tutorial_body("https://zenodo.org/record/1", "\nSTEPS\n");
        assert!(body.contains("[Zenodo](https://zenodo.org/record/1)"));
        assert!(body.contains(Z_FILE_LINKS_MARKER));
        assert!(body.contains("\nSTEPS\n"));
    }

    #[test]
    fn data_upload_is_refilled() {
        let body = tutorial_body("", "");
        let links = vec![
            "https://zenodo.org/api/files/abc/reads.fastq".to_string(),
            "https://zenodo.org/api/files/abc/counts.tabular".to_string(),
        ];

        let filled = fill_data_upload(&body, "https://zenodo.org/record/1", &links);
        assert!(filled.contains("[Zenodo](https://zenodo.org/record/1)"));
        assert!(filled.contains(
            ">    ```\n>    https://zenodo.org/api/files/abc/reads.fastq\n>    https://zenodo.org/api/files/abc/counts.tabular\n>    ```"
        ));
        assert!(!filled.contains(Z_FILE_LINKS_MARKER));
        assert_eq!(data_upload_links(&filled), links);

        let replaced = fill_data_upload(&filled, "https://zenodo.org/record/2", &links[..1]);
        assert!(replaced.contains("[Zenodo](https://zenodo.org/record/2)"));
        assert!(!replaced.contains("counts.tabular"));

        let cleared = fill_data_upload(&filled, "", &[]);
        assert!(cleared.contains("[Zenodo]()"));
        assert!(cleared.contains(Z_FILE_LINKS_MARKER));
        assert!(data_upload_links(&cleared).is_empty());
    }

    #[test]
    fn body_without_data_upload_is_untouched() {
        let body = "# Introduction\n\nNo data here.\n";
        assert_eq!(fill_data_upload(body, "https://zenodo.org/record/1", &[]), body);
        assert!(data_upload_links(body).is_empty());
    }

    #[test]
    fn default_box() {
        let hands_on = default_hands_on_box();
        assert!(hands_on.contains("## Sub-step with **My Tool**"));
        assert!(hands_on.contains(">    - {% icon param-file %} *\"Input file\"*: File"));
        assert!(hands_on.contains(">    - *\"Parameter\"*: `a value`"));
    }
}
